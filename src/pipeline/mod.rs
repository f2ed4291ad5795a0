//! Pixel-level background removal pipeline
//!
//! Four stages run strictly in order over one RGBA buffer:
//!
//! 1. [`estimate_background_color`] averages 10x10 samples from the four corners.
//! 2. [`calibrate_threshold`] takes the 25th percentile of sampled distances to
//!    that color, clamped to `[30, 80]`.
//! 3. [`classify_pixels`] ramps alpha down for pixels closer than the threshold.
//! 4. [`smooth_edges`] box-blurs partially transparent alpha values.
//!
//! The stages are plain functions over explicit [`Color`], [`Threshold`] and
//! [`Dimensions`] values so each one can be exercised on its own. Color channels
//! are never written; only alpha changes.
//!
//! Input is expected to be fully opaque. Pixels the classifier leaves alone keep
//! whatever alpha they arrived with.

mod calibrator;
mod classifier;
mod estimator;
mod smoother;

pub use calibrator::calibrate_threshold;
pub use classifier::{classify_pixels, ramp_alpha};
pub use estimator::estimate_background_color;
pub use smoother::smooth_edges;

use crate::{
    error::Result,
    types::{check_buffer_len, Color, Dimensions, Threshold},
    utils::ConfigValidator,
};
use instant::Instant;
use tracing::{debug, instrument};

/// Side length of the square sampled from each corner
pub const CORNER_SAMPLE_SIZE: u32 = 10;

/// Smallest accepted width and height
pub const MIN_DIMENSION: u32 = CORNER_SAMPLE_SIZE;

/// Calibration samples every Nth pixel
pub const CALIBRATION_STRIDE: usize = 10;

/// Rank of the distance picked as threshold, as a fraction of the sample count
pub const CALIBRATION_PERCENTILE: f64 = 0.25;

/// Box blur radius used by the edge smoother
pub const SMOOTHING_RADIUS: u32 = 2;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Estimation,
    Calibration,
    Classification,
    Smoothing,
}

/// Wall-clock time spent per stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub estimation_ms: u64,
    pub calibration_ms: u64,
    pub classification_ms: u64,
    pub smoothing_ms: u64,
}

/// What one pipeline run inferred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineReport {
    pub background: Color,
    pub threshold: Threshold,
    pub dimensions: Dimensions,
    pub timings: StageTimings,
}

/// Check the buffer against the pipeline preconditions
///
/// # Errors
/// - `InvalidDimensions` when either side is below [`MIN_DIMENSION`]
/// - `BufferSizeMismatch` when `pixels_len != width * height * 4`
pub fn validate_input(pixels_len: usize, width: u32, height: u32) -> Result<Dimensions> {
    ConfigValidator::validate_dimensions(width, height, MIN_DIMENSION)?;
    let dimensions = Dimensions::new(width, height);
    check_buffer_len(pixels_len, dimensions)?;
    Ok(dimensions)
}

/// Remove the background of an opaque RGBA buffer in place
///
/// # Errors
/// Fails before touching the buffer if [`validate_input`] rejects it.
///
/// # Examples
///
/// ```rust
/// let mut pixels = [200u8, 200, 200, 255].repeat(16 * 16);
/// let report = trimbg::remove_background(&mut pixels, 16, 16).unwrap();
/// assert_eq!(report.background, trimbg::Color::new(200, 200, 200));
/// assert!(pixels.chunks_exact(4).all(|p| p[3] == 0));
/// ```
pub fn remove_background(pixels: &mut [u8], width: u32, height: u32) -> Result<PipelineReport> {
    remove_background_with_progress(pixels, width, height, |_| {})
}

/// Same as [`remove_background`], calling `on_stage` right before each stage starts
///
/// # Errors
/// Fails before touching the buffer if [`validate_input`] rejects it.
#[instrument(skip(pixels, on_stage), fields(len = pixels.len()))]
pub fn remove_background_with_progress<F>(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    mut on_stage: F,
) -> Result<PipelineReport>
where
    F: FnMut(PipelineStage),
{
    let dimensions = validate_input(pixels.len(), width, height)?;
    let mut timings = StageTimings::default();

    on_stage(PipelineStage::Estimation);
    let start = Instant::now();
    let background = estimate_background_color(pixels, dimensions);
    timings.estimation_ms = start.elapsed().as_millis() as u64;
    debug!(background = %background, "Estimated background color");

    on_stage(PipelineStage::Calibration);
    let start = Instant::now();
    let threshold = calibrate_threshold(pixels, background, dimensions);
    timings.calibration_ms = start.elapsed().as_millis() as u64;
    debug!(threshold = threshold.value(), "Calibrated threshold");

    on_stage(PipelineStage::Classification);
    let start = Instant::now();
    classify_pixels(pixels, background, threshold, dimensions);
    timings.classification_ms = start.elapsed().as_millis() as u64;

    on_stage(PipelineStage::Smoothing);
    let start = Instant::now();
    smooth_edges(pixels, dimensions, SMOOTHING_RADIUS);
    timings.smoothing_ms = start.elapsed().as_millis() as u64;

    Ok(PipelineReport {
        background,
        threshold,
        dimensions,
        timings,
    })
}
