//! Output format handling service

use crate::{config::OutputFormat, error::Result};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

/// Service for handling output format conversions
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Convert an RGBA image to the pixel layout the output format stores
    ///
    /// JPEG has no alpha channel, so it gets RGB with alpha dropped.
    #[must_use]
    pub fn convert_format(rgba_image: RgbaImage, format: OutputFormat) -> DynamicImage {
        match format {
            OutputFormat::Png | OutputFormat::Rgba8 | OutputFormat::Tiff | OutputFormat::WebP => {
                DynamicImage::ImageRgba8(rgba_image)
            },
            OutputFormat::Jpeg => DynamicImage::ImageRgba8(rgba_image).to_rgb8().into(),
        }
    }

    /// The `image` crate format used to encode, `None` for raw output
    #[must_use]
    pub fn image_format(format: OutputFormat) -> Option<ImageFormat> {
        match format {
            OutputFormat::Png => Some(ImageFormat::Png),
            OutputFormat::Jpeg => Some(ImageFormat::Jpeg),
            OutputFormat::WebP => Some(ImageFormat::WebP),
            OutputFormat::Tiff => Some(ImageFormat::Tiff),
            OutputFormat::Rgba8 => None,
        }
    }

    /// Get the appropriate file extension for a given output format
    ///
    /// # Examples
    /// ```rust
    /// use trimbg::{services::OutputFormatHandler, OutputFormat};
    ///
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Png), "png");
    /// assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Jpeg), "jpg");
    /// ```
    #[must_use]
    pub fn get_extension(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Rgba8 => "rgba8",
        }
    }

    /// Check if a format supports transparency (alpha channel)
    #[must_use]
    pub fn supports_transparency(format: OutputFormat) -> bool {
        match format {
            OutputFormat::Png | OutputFormat::WebP | OutputFormat::Tiff | OutputFormat::Rgba8 => {
                true
            },
            OutputFormat::Jpeg => false,
        }
    }

    /// Warn when the chosen format would throw the removed background away
    pub fn validate_for_background_removal(format: OutputFormat) {
        if !Self::supports_transparency(format) {
            log::warn!(
                "Output format {:?} does not support transparency. Background removal results will appear with a solid background.",
                format
            );
        }
    }

    /// Encode an RGBA image into bytes of the given format
    ///
    /// `quality` is only used by JPEG.
    pub fn encode_to_bytes(image: &RgbaImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        match format {
            OutputFormat::Rgba8 => return Ok(image.as_raw().clone()),
            OutputFormat::Jpeg => {
                let rgb_image = Self::convert_format(image.clone(), format).to_rgb8();
                let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut buffer,
                    quality.min(100),
                );
                encoder.encode_image(&rgb_image)?;
            },
            #[cfg(not(feature = "webp-support"))]
            OutputFormat::WebP => {
                return Err(crate::error::BgRemovalError::unsupported_format(
                    "WebP output requires the webp-support feature",
                ));
            },
            #[cfg(feature = "webp-support")]
            OutputFormat::WebP => {
                if let Some(image_format) = Self::image_format(format) {
                    let mut cursor = Cursor::new(&mut buffer);
                    image.write_to(&mut cursor, image_format)?;
                }
            },
            OutputFormat::Png | OutputFormat::Tiff => {
                if let Some(image_format) = Self::image_format(format) {
                    let mut cursor = Cursor::new(&mut buffer);
                    image.write_to(&mut cursor, image_format)?;
                }
            },
        }
        Ok(buffer)
    }
}
