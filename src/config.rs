//! Configuration types for background removal operations

use crate::{error::BgRemovalError, utils::ConfigValidator};
use serde::{Deserialize, Serialize};

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    #[default]
    Png,
    /// JPEG (no transparency, alpha dropped)
    Jpeg,
    /// WebP with alpha channel transparency (lossless)
    WebP,
    /// TIFF with alpha channel transparency and lossless compression
    Tiff,
    /// Raw RGBA8 pixel data (4 bytes per pixel)
    Rgba8,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
            Self::WebP => write!(f, "webp"),
            Self::Tiff => write!(f, "tiff"),
            Self::Rgba8 => write!(f, "rgba8"),
        }
    }
}

/// Configuration for background removal operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalConfig {
    /// Output format
    pub output_format: OutputFormat,

    /// JPEG quality (0-100, only used for JPEG output)
    pub jpeg_quality: u8,

    /// WebP quality (0-100). The `image` crate only encodes lossless WebP, so
    /// this is validated and carried but does not change the output.
    pub webp_quality: u8,

    /// Reset the alpha channel to fully opaque before processing.
    ///
    /// The pipeline assumes opaque input; turning this off keeps any source
    /// transparency for pixels the classifier leaves untouched.
    pub flatten_input_alpha: bool,

    /// Enable debug mode (additional logging)
    pub debug: bool,
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::default(),
            jpeg_quality: 90,
            webp_quality: 85,
            flatten_input_alpha: true,
            debug: false,
        }
    }
}

impl RemovalConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trimbg::{OutputFormat, RemovalConfig};
    ///
    /// let config = RemovalConfig::builder()
    ///     .output_format(OutputFormat::WebP)
    ///     .flatten_input_alpha(false)
    ///     .build()
    ///     .unwrap();
    /// assert!(!config.flatten_input_alpha);
    /// ```
    #[must_use]
    pub fn builder() -> RemovalConfigBuilder {
        RemovalConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Invalid JPEG quality value (must be 0-100)
    /// - Invalid WebP quality value (must be 0-100)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trimbg::RemovalConfig;
    ///
    /// let mut config = RemovalConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.jpeg_quality = 150;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> crate::Result<()> {
        if ConfigValidator::validate_jpeg_quality(self.jpeg_quality).is_err() {
            return Err(BgRemovalError::config_value_error(
                "JPEG quality",
                self.jpeg_quality,
                "0-100",
                Some(90),
            ));
        }

        if ConfigValidator::validate_webp_quality(self.webp_quality).is_err() {
            return Err(BgRemovalError::config_value_error(
                "WebP quality",
                self.webp_quality,
                "0-100",
                Some(85),
            ));
        }

        Ok(())
    }

    /// Quality value relevant to the configured output format
    #[must_use]
    pub fn quality_for_output(&self) -> u8 {
        match self.output_format {
            OutputFormat::WebP => self.webp_quality,
            _ => self.jpeg_quality,
        }
    }
}

/// Builder for `RemovalConfig`
#[derive(Debug, Default)]
pub struct RemovalConfigBuilder {
    config: RemovalConfig,
}

impl RemovalConfigBuilder {
    /// Set output format
    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// Set JPEG quality
    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.min(100);
        self
    }

    /// Set WebP quality
    #[must_use]
    pub fn webp_quality(mut self, quality: u8) -> Self {
        self.config.webp_quality = quality.min(100);
        self
    }

    /// Reset input alpha to opaque before processing
    #[must_use]
    pub fn flatten_input_alpha(mut self, flatten: bool) -> Self {
        self.config.flatten_input_alpha = flatten;
        self
    }

    /// Enable debug mode
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// Propagates [`RemovalConfig::validate`] failures.
    pub fn build(self) -> crate::Result<RemovalConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
