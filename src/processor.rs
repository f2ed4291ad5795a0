//! Unified background removal processor
//!
//! `BackgroundRemovalProcessor` wraps the pixel pipeline with decoding, alpha
//! flattening, timing and progress reporting. The CLI and the crate-root
//! convenience functions both go through it.

use crate::{
    config::RemovalConfig,
    error::Result,
    pipeline::remove_background_with_progress,
    services::{
        ImageIOService, OutputFormatHandler, ProcessingStage, ProgressReporter, ProgressTracker,
    },
    types::{ProcessingMetadata, ProcessingTimings, RemovalResult},
    utils::flatten_alpha,
};
use image::DynamicImage;
use instant::Instant;
use log::{debug, info};
use std::path::Path;
use tokio::io::AsyncRead;
use tracing::{debug as trace_debug, instrument};

/// Processor that runs background removal with a fixed configuration
pub struct BackgroundRemovalProcessor {
    config: RemovalConfig,
    progress_tracker: Option<ProgressTracker>,
}

impl BackgroundRemovalProcessor {
    /// Create a new processor
    ///
    /// # Errors
    /// Returns `BgRemovalError::InvalidConfig` when the configuration fails validation.
    ///
    /// # Examples
    /// ```rust
    /// use trimbg::{BackgroundRemovalProcessor, RemovalConfig};
    ///
    /// let mut processor = BackgroundRemovalProcessor::new(RemovalConfig::default()).unwrap();
    /// let image = image::DynamicImage::new_rgb8(32, 32);
    /// let result = processor.process_image(&image).unwrap();
    /// assert_eq!(result.transparent_ratio(), 1.0);
    /// ```
    pub fn new(config: RemovalConfig) -> Result<Self> {
        config.validate()?;
        OutputFormatHandler::validate_for_background_removal(config.output_format);

        debug!(
            "Creating processor: format={}, flatten_input_alpha={}",
            config.output_format, config.flatten_input_alpha
        );

        Ok(Self {
            config,
            progress_tracker: None,
        })
    }

    /// Attach a progress reporter
    #[must_use]
    pub fn with_progress_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.progress_tracker = Some(ProgressTracker::new(reporter));
        self
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &RemovalConfig {
        &self.config
    }

    /// Process an image file for background removal
    ///
    /// # Errors
    /// - File I/O errors when reading input
    /// - `Decode` when the file is not a readable image
    /// - Pipeline precondition failures (`InvalidDimensions`)
    pub fn process_file<P: AsRef<Path>>(&mut self, input_path: P) -> Result<RemovalResult> {
        let input_path_ref = input_path.as_ref();
        if let Some(tracker) = self.progress_tracker.as_mut() {
            tracker.restart();
            tracker.report_stage_with_description(
                ProcessingStage::ImageLoading,
                format!("Loading {}", input_path_ref.display()),
            );
        }

        let decode_start = Instant::now();
        let image = match ImageIOService::load_image(input_path_ref) {
            Ok(image) => image,
            Err(e) => {
                self.report_error(&e.to_string());
                return Err(e);
            },
        };
        let decode_ms = decode_start.elapsed().as_millis() as u64;

        let mut result = self.run(&image, decode_ms)?;
        result.metadata.timings.total_ms += decode_ms;
        Ok(result.with_input_path(input_path_ref.display().to_string()))
    }

    /// Process a `DynamicImage` directly for background removal
    ///
    /// # Errors
    /// Pipeline precondition failures (`InvalidDimensions`).
    pub fn process_image(&mut self, image: &DynamicImage) -> Result<RemovalResult> {
        if let Some(tracker) = self.progress_tracker.as_mut() {
            tracker.restart();
        }
        self.run(image, 0)
    }

    /// Process image data from bytes
    ///
    /// # Errors
    /// - `Decode` when the bytes are not a readable image
    /// - Pipeline precondition failures (`InvalidDimensions`)
    pub fn process_bytes(&mut self, image_bytes: &[u8]) -> Result<RemovalResult> {
        self.start_stage(ProcessingStage::ImageLoading);

        let decode_start = Instant::now();
        let image = match ImageIOService::load_from_bytes(image_bytes) {
            Ok(image) => image,
            Err(e) => {
                self.report_error(&e.to_string());
                return Err(e);
            },
        };
        let decode_ms = decode_start.elapsed().as_millis() as u64;

        let mut result = self.run(&image, decode_ms)?;
        result.metadata.timings.total_ms += decode_ms;
        Ok(result)
    }

    /// Process image data from an async reader stream
    ///
    /// # Errors
    /// - Stream reading failures
    /// - Everything [`Self::process_bytes`] can fail with
    pub async fn process_reader<R: AsyncRead + Unpin>(
        &mut self,
        mut reader: R,
    ) -> Result<RemovalResult> {
        use tokio::io::AsyncReadExt;

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).await?;
        self.process_bytes(&buffer)
    }

    #[instrument(
        skip(self, image),
        fields(dimensions = %format!("{}x{}", image.width(), image.height()))
    )]
    fn run(&mut self, image: &DynamicImage, decode_ms: u64) -> Result<RemovalResult> {
        let total_start = Instant::now();
        let mut rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        let flattened = if self.config.flatten_input_alpha {
            let count = flatten_alpha(&mut rgba);
            if count > 0 {
                trace_debug!(pixels = count, "Reset non-opaque input alpha");
            }
            count > 0
        } else {
            false
        };

        let tracker = &mut self.progress_tracker;
        let outcome = remove_background_with_progress(&mut rgba, width, height, |stage| {
            if let Some(tracker) = tracker.as_mut() {
                tracker.report_stage(stage.into());
            }
        });
        let report = match outcome {
            Ok(report) => report,
            Err(e) => {
                self.report_error(&e.to_string());
                return Err(e);
            },
        };

        let timings = ProcessingTimings {
            image_decode_ms: decode_ms,
            estimation_ms: report.timings.estimation_ms,
            calibration_ms: report.timings.calibration_ms,
            classification_ms: report.timings.classification_ms,
            smoothing_ms: report.timings.smoothing_ms,
            image_encode_ms: None,
            total_ms: total_start.elapsed().as_millis() as u64,
        };

        info!(
            "Removed background {} (threshold {:.2}) from {}x{} image",
            report.background.to_hex(),
            report.threshold.value(),
            width,
            height
        );
        debug!(
            "Pipeline stages took {}ms of {}ms",
            timings.pipeline_ms(),
            timings.total_ms
        );

        if let Some(tracker) = self.progress_tracker.as_mut() {
            tracker.report_stage(ProcessingStage::Completed);
            tracker.report_completion(timings.clone());
        }

        let metadata = ProcessingMetadata {
            background: report.background,
            threshold: report.threshold,
            dimensions: report.dimensions,
            input_alpha_flattened: flattened,
            timings,
        };

        Ok(RemovalResult::new(rgba, metadata))
    }

    fn start_stage(&mut self, stage: ProcessingStage) {
        if let Some(tracker) = self.progress_tracker.as_mut() {
            tracker.restart();
            tracker.report_stage(stage);
        }
    }

    fn report_error(&self, error: &str) {
        if let Some(tracker) = &self.progress_tracker {
            tracker.report_error(error);
        }
    }
}
