//! Image I/O operations service
//!
//! Decoding and encoding are kept out of the pipeline; a decode failure here
//! means the pipeline is never invoked.

use crate::{
    config::OutputFormat,
    error::{BgRemovalError, Result},
    services::OutputFormatHandler,
};
use image::{DynamicImage, RgbaImage};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// Extension-based format detection is tried first, then content sniffing.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use trimbg::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("input.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(BgRemovalError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );

                let data = std::fs::read(path_ref).map_err(|io_err| {
                    BgRemovalError::file_io_error("read image data", path_ref, &io_err)
                })?;

                image::load_from_memory(&data).map_err(|content_err| {
                    let extension = path_ref
                        .extension()
                        .and_then(|s| s.to_str())
                        .unwrap_or("unknown");

                    BgRemovalError::decode(format!(
                        "'{}' ({} bytes, extension {}): extension error: {}; content error: {}",
                        path_ref.display(),
                        data.len(),
                        extension,
                        e,
                        content_err
                    ))
                })
            },
        }
    }

    /// Load an image from bytes
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes)
            .map_err(|e| BgRemovalError::decode(format!("Failed to decode image from bytes: {}", e)))
    }

    /// Load an image from an async reader
    pub async fn load_from_reader<R: AsyncRead + Unpin>(mut reader: R) -> Result<DynamicImage> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).await?;
        Self::load_from_bytes(&buffer)
    }

    /// Save an RGBA image to a file in the specified format
    ///
    /// Missing parent directories are created.
    pub fn save_image<P: AsRef<Path>>(
        image: &RgbaImage,
        path: P,
        format: OutputFormat,
        quality: u8,
    ) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                BgRemovalError::file_io_error("create output directory", parent, &e)
            })?;
        }

        let bytes = OutputFormatHandler::encode_to_bytes(image, format, quality).map_err(|e| {
            BgRemovalError::processing_stage_error(
                "image save",
                &format!("Failed to encode as {}: {}", format, e),
                Some(&format!("path: {}", path_ref.display())),
            )
        })?;

        std::fs::write(path_ref, bytes)
            .map_err(|e| BgRemovalError::file_io_error("write image", path_ref, &e))
    }

    /// Check if a file path has a supported image extension
    #[must_use]
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                matches!(
                    ext.to_lowercase().as_str(),
                    "jpg" | "jpeg" | "png" | "webp" | "tiff" | "tif" | "bmp"
                )
            })
    }
}
