#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # trimbg
//!
//! Model-free background removal. The background color is inferred from the
//! image corners, a distance threshold is calibrated from a sample of the
//! image, and alpha is ramped down for pixels close to the background before a
//! small box blur softens the edges.
//!
//! ## Features
//!
//! - **No model**: nothing to download, the whole pipeline is a few passes over
//!   an RGBA buffer
//! - **Buffer API**: [`remove_background`] works in place on raw `width*height*4` bytes
//! - **Image API**: [`BackgroundRemovalProcessor`] decodes, processes and encodes
//!   JPEG, PNG, WebP, BMP and TIFF through the `image` crate
//! - **CLI Integration**: `trimbg` binary (enable with the `cli` feature)
//! - **Async and Sync APIs**
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trimbg::{remove_background_from_reader, RemovalConfig};
//! use tokio::fs::File;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RemovalConfig::default();
//! let file = File::open("product.jpg").await?;
//! let result = remove_background_from_reader(file, &config).await?;
//! result.save_png("product_bg_removed.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! Working directly on a pixel buffer:
//!
//! ```rust
//! let mut pixels = [255u8, 255, 255, 255].repeat(20 * 20);
//! let report = trimbg::remove_background(&mut pixels, 20, 20)?;
//! assert_eq!(report.background.to_hex(), "#ffffff");
//! # Ok::<(), trimbg::BgRemovalError>(())
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface and tracing subscriber setup
//! - `webp-support` (default): WebP decoding and encoding
//! - `tracing-json`: JSON log output for the CLI
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! trimbg = { version = "0.1", default-features = false }
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod utils;

use tokio::io::AsyncRead;

pub use config::{OutputFormat, RemovalConfig, RemovalConfigBuilder};
pub use error::{BgRemovalError, Result};
pub use pipeline::{
    calibrate_threshold, classify_pixels, estimate_background_color, remove_background,
    remove_background_with_progress, smooth_edges, PipelineReport, PipelineStage, StageTimings,
};
pub use processor::BackgroundRemovalProcessor;
pub use services::{
    ConsoleProgressReporter, ImageIOService, NoOpProgressReporter, OutputFormatHandler,
    ProcessingStage, ProgressReporter, ProgressTracker, ProgressUpdate,
};
pub use types::{
    Color, Dimensions, PixelBuffer, ProcessingMetadata, ProcessingTimings, RemovalResult,
    Threshold,
};
pub use utils::{color_distance, ConfigValidator};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Remove background from an image provided as bytes
///
/// # Arguments
///
/// * `image_bytes` - Encoded image data (JPEG, PNG, WebP, BMP, TIFF)
/// * `config` - Configuration for the removal operation
///
/// # Examples
///
/// ```rust,no_run
/// use trimbg::{remove_background_from_bytes, OutputFormat, RemovalConfig};
///
/// # async fn example(upload_bytes: Vec<u8>) -> anyhow::Result<()> {
/// let config = RemovalConfig::default();
/// let result = remove_background_from_bytes(&upload_bytes, &config).await?;
/// let png_bytes = result.to_bytes(OutputFormat::Png, 100)?;
/// # Ok(())
/// # }
/// ```
pub async fn remove_background_from_bytes(
    image_bytes: &[u8],
    config: &RemovalConfig,
) -> Result<RemovalResult> {
    let mut processor = BackgroundRemovalProcessor::new(config.clone())?;
    processor.process_bytes(image_bytes)
}

/// Remove background from a `DynamicImage` directly
///
/// # Examples
///
/// ```rust,no_run
/// use trimbg::{remove_background_from_image, RemovalConfig};
/// use image::DynamicImage;
///
/// # async fn example(img: DynamicImage) -> anyhow::Result<()> {
/// let result = remove_background_from_image(img, &RemovalConfig::default()).await?;
/// result.save_png("output.png")?;
/// # Ok(())
/// # }
/// ```
pub async fn remove_background_from_image(
    image: image::DynamicImage,
    config: &RemovalConfig,
) -> Result<RemovalResult> {
    let mut processor = BackgroundRemovalProcessor::new(config.clone())?;
    processor.process_image(&image)
}

/// Remove background from an async reader stream
///
/// The stream is read to the end before decoding.
///
/// # Examples
///
/// ```rust,no_run
/// use trimbg::{remove_background_from_reader, RemovalConfig};
/// use std::io::Cursor;
///
/// # async fn example(image_bytes: Vec<u8>) -> anyhow::Result<()> {
/// let reader = Cursor::new(image_bytes);
/// let result = remove_background_from_reader(reader, &RemovalConfig::default()).await?;
/// println!("{}", result.timing_summary());
/// # Ok(())
/// # }
/// ```
pub async fn remove_background_from_reader<R: AsyncRead + Unpin>(
    reader: R,
    config: &RemovalConfig,
) -> Result<RemovalResult> {
    let mut processor = BackgroundRemovalProcessor::new(config.clone())?;
    processor.process_reader(reader).await
}
