//! Background Removal CLI Tool
//!
//! Command-line interface for removing uniform backgrounds from images.

use super::config::CliConfigBuilder;
use crate::{
    processor::BackgroundRemovalProcessor,
    services::{ConsoleProgressReporter, ImageIOService, OutputFormatHandler},
    tracing_config::{events, init_cli_tracing, spans},
    types::RemovalResult,
    OutputFormat,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Remove uniform backgrounds from images without a segmentation model
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "trimbg")]
pub struct Cli {
    /// Input image files or directories (use "-" for stdin)
    #[arg(value_name = "INPUT", required = true)]
    pub input: Vec<String>,

    /// Output file (single input) or directory (batch processing). Use "-" for stdout.
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = CliOutputFormat::Png)]
    pub format: CliOutputFormat,

    /// JPEG quality (0-100)
    #[arg(long, default_value_t = 90)]
    pub jpeg_quality: u8,

    /// WebP quality (0-100)
    #[arg(long, default_value_t = 85)]
    pub webp_quality: u8,

    /// Enable verbose logging (-v: DEBUG for trimbg, -vv: TRACE, -vvv: everything)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Process directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// File name pattern for directory inputs (e.g., "*.jpg")
    #[arg(long)]
    pub pattern: Option<String>,

    /// Keep the input alpha channel instead of treating the image as opaque
    #[arg(long)]
    pub keep_alpha: bool,

    /// Print the estimated background, threshold and timings as JSON to stderr
    #[arg(long)]
    pub stats: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Jpeg,
    Webp,
    Tiff,
    Rgba8,
}

/// Where a processed image goes
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// Per-run outcome counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct BatchSummary {
    processed: usize,
    failed: usize,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;
    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;

    debug!("Input(s): {}", cli.input.join(", "));
    debug!("Configuration: {:?}", config);

    let mut processor = BackgroundRemovalProcessor::new(config)
        .context("Failed to create background removal processor")?;
    if cli.verbose > 0 {
        processor = processor
            .with_progress_reporter(Box::new(ConsoleProgressReporter::new(cli.verbose > 1)));
    }

    let start_time = Instant::now();
    let summary = process_inputs(&cli, &mut processor).await?;

    info!(
        "Processed {} image(s) in {:.2}s",
        summary.processed,
        start_time.elapsed().as_secs_f64()
    );

    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} image(s) failed to process",
            summary.failed,
            summary.processed + summary.failed
        );
    }

    Ok(())
}

async fn process_inputs(
    cli: &Cli,
    processor: &mut BackgroundRemovalProcessor,
) -> Result<BatchSummary> {
    if cli.input.len() == 1 && cli.input.first().is_some_and(|s| s == "-") {
        process_stdin(cli, processor)?;
        return Ok(BatchSummary {
            processed: 1,
            failed: 0,
        });
    }

    let mut all_files = collect_input_files(cli)?;
    if all_files.is_empty() {
        warn!("No supported image files found in the provided inputs");
        return Ok(BatchSummary::default());
    }

    all_files.sort();
    all_files.dedup();
    let file_count = all_files.len();
    info!("Found {} image file(s) to process", file_count);

    let format = processor.config().output_format;
    let output_dir = if file_count > 1 {
        prepare_output_dir(cli.output.as_deref())?
    } else {
        None
    };

    let progress = if file_count > 1 {
        let pb = ProgressBar::new(file_count as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let _batch_span = spans::batch_processing(file_count).entered();
    let batch_start_time = Instant::now();
    let mut summary = BatchSummary::default();

    for input_file in &all_files {
        if let Some(ref pb) = progress {
            pb.set_message(format!("Processing {}", input_file.display()));
        }

        let target = match &output_dir {
            Some(dir) => OutputTarget::File(generate_output_path_with_dir(input_file, dir, format)),
            None if file_count > 1 => OutputTarget::File(generate_output_path(input_file, format)),
            None => resolve_single_output(cli.output.as_deref(), input_file, format),
        };

        match process_single_file(cli, processor, input_file, &target) {
            Ok(()) => {
                summary.processed += 1;
                log::debug!("✅ Processed: {}", input_file.display());
            },
            Err(e) => {
                summary.failed += 1;
                events::error_with_context(
                    &format!("{:#}", e),
                    &input_file.display().to_string(),
                );
                error!("❌ Failed to process {}: {:#}", input_file.display(), e);
            },
        }

        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message(format!(
            "Completed! Processed: {}, Failed: {}",
            summary.processed, summary.failed
        ));
    }

    if file_count > 1 {
        let batch_total_time = batch_start_time.elapsed();
        info!("📊 Batch processing summary:");
        info!("  ├─ Files processed: {}", summary.processed);
        info!("  ├─ Files failed: {}", summary.failed);
        info!("  ├─ Total time: {:.2}s", batch_total_time.as_secs_f64());
        info!(
            "  └─ Average per file: {:.2}s",
            if summary.processed > 0 {
                batch_total_time.as_secs_f64() / (summary.processed as f64)
            } else {
                0.0
            }
        );
    }

    Ok(summary)
}

/// Expand files and directories into the list of images to process
fn collect_input_files(cli: &Cli) -> Result<Vec<PathBuf>> {
    let mut all_files = Vec::new();

    for input in &cli.input {
        let path = PathBuf::from(input);

        if path.is_file() {
            if is_image_file(&path) {
                all_files.push(path);
            } else {
                warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            all_files.extend(find_image_files(&path, cli.recursive, cli.pattern.as_deref())?);
        } else {
            anyhow::bail!(
                "Input path does not exist or is not accessible: {}",
                path.display()
            );
        }
    }

    Ok(all_files)
}

/// Validate and create the batch output directory
fn prepare_output_dir(output: Option<&str>) -> Result<Option<PathBuf>> {
    let Some(output) = output else {
        return Ok(None);
    };

    if output == "-" {
        anyhow::bail!("Cannot use stdout (-) as output when processing multiple files");
    }

    let output_path = PathBuf::from(output);
    if output_path.is_file() {
        anyhow::bail!(
            "Output path exists and is a file, not a directory: {}",
            output_path.display()
        );
    }
    if !output_path.exists() {
        std::fs::create_dir_all(&output_path).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;
    }

    Ok(Some(output_path))
}

/// Process image from stdin
fn process_stdin(cli: &Cli, processor: &mut BackgroundRemovalProcessor) -> Result<()> {
    info!("Reading image from stdin");

    let image_data = read_stdin()?;
    match image::guess_format(&image_data) {
        Ok(format) => debug!("Detected stdin image format: {:?}", format),
        Err(_) => warn!("Could not detect image format from stdin data"),
    }

    let start_time = Instant::now();
    let mut result = processor
        .process_bytes(&image_data)
        .context("Failed to remove background from stdin image")?;
    info!(
        "Processed stdin image in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    let target = match cli.output.as_deref() {
        None | Some("-") => OutputTarget::Stdout,
        Some(path) => OutputTarget::File(PathBuf::from(path)),
    };
    write_result(cli, processor, &mut result, &target)
}

/// Process a single image file
fn process_single_file(
    cli: &Cli,
    processor: &mut BackgroundRemovalProcessor,
    input_path: &Path,
    target: &OutputTarget,
) -> Result<()> {
    let format = processor.config().output_format;
    let _span = spans::file_processing(input_path, &format.to_string()).entered();

    let mut result = processor
        .process_file(input_path)
        .context("Failed to remove background")?;

    let timings = result.timings();
    let breakdown = timings.breakdown_percentages();
    debug!("📊 Processing breakdown for {}:", input_path.display());
    debug!(
        "  ├─ Image Decode: {}ms ({:.1}%)",
        timings.image_decode_ms, breakdown.decode_pct
    );
    debug!(
        "  ├─ Estimation: {}ms ({:.1}%)",
        timings.estimation_ms, breakdown.estimation_pct
    );
    debug!(
        "  ├─ Calibration: {}ms ({:.1}%)",
        timings.calibration_ms, breakdown.calibration_pct
    );
    debug!(
        "  ├─ Classification: {}ms ({:.1}%)",
        timings.classification_ms, breakdown.classification_pct
    );
    debug!(
        "  └─ Smoothing: {}ms ({:.1}%)",
        timings.smoothing_ms, breakdown.smoothing_pct
    );

    write_result(cli, processor, &mut result, target)
}

/// Send a processed image to its target and optionally print stats
fn write_result(
    cli: &Cli,
    processor: &BackgroundRemovalProcessor,
    result: &mut RemovalResult,
    target: &OutputTarget,
) -> Result<()> {
    let config = processor.config();
    let quality = config.quality_for_output();

    match target {
        OutputTarget::Stdout => {
            let encode_start = Instant::now();
            let output_data = result.to_bytes(config.output_format, quality)?;
            result.metadata.timings.image_encode_ms =
                Some(encode_start.elapsed().as_millis() as u64);
            write_stdout(&output_data)?;
            info!("Image written to stdout");
        },
        OutputTarget::File(path) => {
            result
                .save_timed(path, config.output_format, quality)
                .with_context(|| format!("Failed to save result to {}", path.display()))?;
            info!("Image saved to: {}", path.display());
        },
    }

    if let Some(encode_ms) = result.timings().image_encode_ms {
        events::performance_metric("image_encode", encode_ms);
    }

    if cli.stats {
        eprintln!("{}", result.metadata.to_json()?);
    }

    Ok(())
}

/// Read image data from stdin
fn read_stdin() -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read image data from stdin")?;

    if buffer.is_empty() {
        anyhow::bail!("No data received from stdin");
    }

    Ok(buffer)
}

/// Write image data to stdout
fn write_stdout(data: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(data)
        .context("Failed to write image data to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}

/// Find image files in a directory
fn find_image_files(dir: &Path, recursive: bool, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if recursive {
        for entry in walkdir::WalkDir::new(dir) {
            let entry = entry?;
            if entry.file_type().is_file() {
                let path = entry.path();
                if is_image_file(path) && matches_pattern(path, pattern) {
                    files.push(path.to_path_buf());
                }
            }
        }
    } else {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let path = entry.path();
                if is_image_file(&path) && matches_pattern(&path, pattern) {
                    files.push(path);
                }
            }
        }
    }

    Ok(files)
}

/// Check if file is an image based on extension
fn is_image_file(path: &Path) -> bool {
    ImageIOService::is_supported_format(path)
}

/// Check if the file name matches the given glob pattern
fn matches_pattern(path: &Path, pattern: Option<&str>) -> bool {
    match pattern {
        Some(pat) => path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|filename| {
                glob::Pattern::new(pat)
                    .map(|p| p.matches(filename))
                    .unwrap_or(false)
            }),
        None => true,
    }
}

/// Output target for a single input file
fn resolve_single_output(output: Option<&str>, input_path: &Path, format: OutputFormat) -> OutputTarget {
    match output {
        Some("-") => OutputTarget::Stdout,
        Some(path) if Path::new(path).is_dir() => {
            OutputTarget::File(generate_output_path_with_dir(input_path, Path::new(path), format))
        },
        Some(path) => OutputTarget::File(PathBuf::from(path)),
        None => OutputTarget::File(generate_output_path(input_path, format)),
    }
}

/// Default output path next to the input
fn generate_output_path(input_path: &Path, format: OutputFormat) -> PathBuf {
    let dir = input_path.parent().unwrap_or(Path::new("."));
    generate_output_path_with_dir(input_path, dir, format)
}

/// Output path inside `output_dir`
fn generate_output_path_with_dir(input_path: &Path, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let stem = input_path.file_stem().unwrap_or_default();
    let extension = OutputFormatHandler::get_extension(format);

    output_dir.join(format!(
        "{}_bg_removed.{}",
        stem.to_string_lossy(),
        extension
    ))
}
