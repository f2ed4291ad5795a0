//! Configuration validation utilities
//!
//! Shared validation logic for parameters coming from the library API and
//! the command line.

use crate::{error::BgRemovalError, Result};

/// Utility for validating configuration parameters
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate JPEG quality parameter
    ///
    /// # Examples
    /// ```rust
    /// use trimbg::utils::ConfigValidator;
    ///
    /// assert!(ConfigValidator::validate_jpeg_quality(90).is_ok());
    /// assert!(ConfigValidator::validate_jpeg_quality(150).is_err());
    /// ```
    pub fn validate_jpeg_quality(quality: u8) -> Result<()> {
        if quality > 100 {
            return Err(BgRemovalError::invalid_config(
                "JPEG quality must be between 0 and 100",
            ));
        }
        Ok(())
    }

    /// Validate WebP quality parameter
    pub fn validate_webp_quality(quality: u8) -> Result<()> {
        if quality > 100 {
            return Err(BgRemovalError::invalid_config(
                "WebP quality must be between 0 and 100",
            ));
        }
        Ok(())
    }

    /// Validate both JPEG and WebP quality parameters
    pub fn validate_quality_settings(jpeg_quality: u8, webp_quality: u8) -> Result<()> {
        Self::validate_jpeg_quality(jpeg_quality)?;
        Self::validate_webp_quality(webp_quality)?;
        Ok(())
    }

    /// Reject images smaller than `minimum` in either direction
    pub fn validate_dimensions(width: u32, height: u32, minimum: u32) -> Result<()> {
        if width < minimum || height < minimum {
            return Err(BgRemovalError::InvalidDimensions {
                width,
                height,
                minimum,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_quality_validation() {
        assert!(ConfigValidator::validate_jpeg_quality(0).is_ok());
        assert!(ConfigValidator::validate_jpeg_quality(100).is_ok());
        assert!(ConfigValidator::validate_jpeg_quality(101).is_err());
        assert!(ConfigValidator::validate_jpeg_quality(255).is_err());
    }

    #[test]
    fn test_quality_settings_validation() {
        assert!(ConfigValidator::validate_quality_settings(90, 85).is_ok());
        assert!(ConfigValidator::validate_quality_settings(101, 85).is_err());
        assert!(ConfigValidator::validate_quality_settings(90, 101).is_err());
    }

    #[test]
    fn test_dimension_validation() {
        assert!(ConfigValidator::validate_dimensions(10, 10, 10).is_ok());
        assert!(ConfigValidator::validate_dimensions(1920, 1080, 10).is_ok());

        let err = ConfigValidator::validate_dimensions(9, 100, 10).unwrap_err();
        assert!(matches!(
            err,
            BgRemovalError::InvalidDimensions {
                width: 9,
                height: 100,
                minimum: 10
            }
        ));
        assert!(ConfigValidator::validate_dimensions(100, 0, 10).is_err());
    }
}
