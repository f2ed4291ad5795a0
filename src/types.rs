//! Core types for background removal operations

use crate::{
    config::OutputFormat,
    error::{BgRemovalError, Result},
    services::{ImageIOService, OutputFormatHandler},
};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// An RGB triple. Alpha never takes part in color comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as `#rrggbb`
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Calibrated color-distance cutoff, always inside `[Threshold::MIN, Threshold::MAX]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Threshold(f64);

impl Threshold {
    /// Lower clamp bound
    pub const MIN: f64 = 30.0;
    /// Upper clamp bound
    pub const MAX: f64 = 80.0;

    /// Clamp an arbitrary distance into the threshold range.
    ///
    /// NaN maps to [`Threshold::MIN`].
    #[must_use]
    pub fn clamped(distance: f64) -> Self {
        if distance.is_nan() {
            return Self(Self::MIN);
        }
        Self(distance.clamp(Self::MIN, Self::MAX))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Image dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels, `None` if it does not fit in `usize`
    #[must_use]
    pub fn pixel_count(&self) -> Option<usize> {
        usize::try_from(u64::from(self.width) * u64::from(self.height)).ok()
    }

    /// Required RGBA buffer length, `None` on overflow
    #[must_use]
    pub fn buffer_len(&self) -> Option<usize> {
        self.pixel_count()?.checked_mul(4)
    }

    /// Byte offset of the red sample of pixel `(x, y)`
    #[must_use]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Owned interleaved RGBA8 buffer whose length always matches its dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    dimensions: Dimensions,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes.
    ///
    /// # Errors
    /// `BufferSizeMismatch` when `data.len() != width * height * 4`.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let dimensions = Dimensions::new(width, height);
        check_buffer_len(data.len(), dimensions)?;
        Ok(Self { data, dimensions })
    }

    #[must_use]
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            dimensions: Dimensions::new(width, height),
        }
    }

    /// Convert back into an `image` buffer
    ///
    /// # Errors
    /// Never fails for a buffer built through the checked constructors.
    pub fn into_rgba_image(self) -> Result<RgbaImage> {
        let Dimensions { width, height } = self.dimensions;
        RgbaImage::from_raw(width, height, self.data)
            .ok_or_else(|| BgRemovalError::processing("RGBA buffer does not match its dimensions"))
    }

    /// Run the full background removal pipeline, consuming and returning the buffer
    ///
    /// # Errors
    /// `InvalidDimensions` for images smaller than the corner sampling window.
    pub fn remove_background(mut self) -> Result<Self> {
        let Dimensions { width, height } = self.dimensions;
        crate::pipeline::remove_background(&mut self.data, width, height)?;
        Ok(self)
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

pub(crate) fn check_buffer_len(actual: usize, dimensions: Dimensions) -> Result<()> {
    match dimensions.buffer_len() {
        Some(expected) if expected == actual => Ok(()),
        Some(expected) => Err(BgRemovalError::BufferSizeMismatch { expected, actual }),
        None => Err(BgRemovalError::BufferSizeMismatch {
            expected: usize::MAX,
            actual,
        }),
    }
}

/// Result of a background removal operation
#[derive(Debug, Clone)]
pub struct RemovalResult {
    /// The processed image with background made transparent
    pub image: RgbaImage,

    /// Processing metadata
    pub metadata: ProcessingMetadata,

    /// Original input path (for logging purposes)
    pub input_path: Option<String>,
}

impl RemovalResult {
    #[must_use]
    pub fn new(image: RgbaImage, metadata: ProcessingMetadata) -> Self {
        Self {
            image,
            metadata,
            input_path: None,
        }
    }

    #[must_use]
    pub fn with_input_path(mut self, input_path: String) -> Self {
        self.input_path = Some(input_path);
        self
    }

    /// Save the result as PNG with alpha channel
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save(path, OutputFormat::Png, 100)
    }

    /// Save in the specified format
    pub fn save<P: AsRef<Path>>(&self, path: P, format: OutputFormat, quality: u8) -> Result<()> {
        ImageIOService::save_image(&self.image, path, format, quality)
    }

    /// Save and record the encode duration in the timings
    pub fn save_timed<P: AsRef<Path>>(
        &mut self,
        path: P,
        format: OutputFormat,
        quality: u8,
    ) -> Result<()> {
        let encode_start = instant::Instant::now();
        self.save(path, format, quality)?;
        self.metadata.timings.image_encode_ms = Some(encode_start.elapsed().as_millis() as u64);
        Ok(())
    }

    /// Encode into bytes of the given format
    pub fn to_bytes(&self, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        OutputFormatHandler::encode_to_bytes(&self.image, format, quality)
    }

    /// Raw RGBA bytes
    #[must_use]
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.image.as_raw().clone()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    #[must_use]
    pub fn timings(&self) -> &ProcessingTimings {
        &self.metadata.timings
    }

    /// Fraction of pixels whose alpha is exactly zero
    #[must_use]
    pub fn transparent_ratio(&self) -> f64 {
        let total = self.image.width() as usize * self.image.height() as usize;
        if total == 0 {
            return 0.0;
        }
        let transparent = self.image.pixels().filter(|p| p.0[3] == 0).count();
        transparent as f64 / total as f64
    }

    /// Get timing summary for display
    #[must_use]
    pub fn timing_summary(&self) -> String {
        let t = &self.metadata.timings;
        let breakdown = t.breakdown_percentages();

        let mut summary = format!(
            "Total: {}ms | Decode: {}ms ({:.1}%) | Estimate: {}ms ({:.1}%) | Calibrate: {}ms ({:.1}%) | Classify: {}ms ({:.1}%) | Smooth: {}ms ({:.1}%)",
            t.total_ms,
            t.image_decode_ms, breakdown.decode_pct,
            t.estimation_ms, breakdown.estimation_pct,
            t.calibration_ms, breakdown.calibration_pct,
            t.classification_ms, breakdown.classification_pct,
            t.smoothing_ms, breakdown.smoothing_pct,
        );

        if let Some(encode_ms) = t.image_encode_ms {
            summary.push_str(&format!(
                " | Encode: {}ms ({:.1}%)",
                encode_ms, breakdown.encode_pct
            ));
        }

        summary
    }
}

/// What the pipeline inferred for one image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    /// Estimated background color
    pub background: Color,

    /// Calibrated distance threshold
    pub threshold: Threshold,

    /// Image dimensions
    pub dimensions: Dimensions,

    /// Whether non-opaque input alpha was reset before processing
    pub input_alpha_flattened: bool,

    /// Timing breakdown
    pub timings: ProcessingTimings,
}

impl ProcessingMetadata {
    /// Serialize as a single JSON line
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| BgRemovalError::processing(format!("Failed to serialize metadata: {}", e)))
    }
}

/// Detailed timing breakdown for background removal processing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Image loading and decoding
    pub image_decode_ms: u64,

    /// Corner sampling
    pub estimation_ms: u64,

    /// Distance sampling, sorting and clamping
    pub calibration_ms: u64,

    /// Per-pixel alpha rewrite
    pub classification_ms: u64,

    /// Alpha box blur
    pub smoothing_ms: u64,

    /// Final image encoding (if saving to file)
    pub image_encode_ms: Option<u64>,

    /// Total end-to-end processing time
    pub total_ms: u64,
}

impl ProcessingTimings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Time spent inside the four pipeline stages
    #[must_use]
    pub fn pipeline_ms(&self) -> u64 {
        self.estimation_ms + self.calibration_ms + self.classification_ms + self.smoothing_ms
    }

    /// Get breakdown percentages
    #[must_use]
    pub fn breakdown_percentages(&self) -> TimingBreakdown {
        if self.total_ms == 0 {
            return TimingBreakdown::default();
        }

        let total = self.total_ms as f64;
        let pct = |ms: u64| (ms as f64 / total) * 100.0;

        TimingBreakdown {
            decode_pct: pct(self.image_decode_ms),
            estimation_pct: pct(self.estimation_ms),
            calibration_pct: pct(self.calibration_ms),
            classification_pct: pct(self.classification_ms),
            smoothing_pct: pct(self.smoothing_ms),
            encode_pct: pct(self.image_encode_ms.unwrap_or(0)),
        }
    }
}

/// Percentage breakdown of timing phases
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingBreakdown {
    pub decode_pct: f64,
    pub estimation_pct: f64,
    pub calibration_pct: f64,
    pub classification_pct: f64,
    pub smoothing_pct: f64,
    pub encode_pct: f64,
}
