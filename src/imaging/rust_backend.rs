//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image::ImageReader` with content sniffing |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality + pixel density) |
//! | EXIF dates | `kamadak-exif` via [`parse_exif_dates`](super::exif_dates::parse_exif_dates) |
//!
//! Decoding sniffs the content rather than trusting the extension: optimized
//! photos are always JPEG, even when the file is still named `*.png`.

use super::backend::{BackendError, Dimensions, ImageBackend, ImageMetadata};
use super::exif_dates::parse_exif_dates;
use super::params::{OptimizeParams, Quality, ThumbnailParams};
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

type FileReader = ImageReader<std::io::BufReader<std::fs::File>>;

fn open_reader(path: &Path) -> Result<FileReader, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_reader(path)?.decode().map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
    })
}

/// Encode as baseline JPEG into memory.
///
/// JPEG has no alpha channel, so everything is flattened to RGB8 first.
fn encode_jpeg(
    img: &DynamicImage,
    quality: Quality,
    density: Option<u16>,
) -> Result<Vec<u8>, BackendError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.value());
    if let Some(dpi) = density {
        encoder.set_pixel_density(PixelDensity::dpi(dpi));
    }
    rgb.write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Dimensions { width, height })
    }

    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata, BackendError> {
        let bytes = std::fs::read(path)?;
        parse_exif_dates(&bytes).ok_or_else(|| {
            BackendError::ProcessingFailed(format!("No EXIF data in {}", path.display()))
        })
    }

    fn optimize(&self, params: &OptimizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.path)?;
        let resized = if (img.width(), img.height()) == (params.width, params.height) {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        // Encode fully before touching the source so a failed encode leaves it intact
        let bytes = encode_jpeg(&resized, params.quality, Some(params.density))?;
        std::fs::write(&params.path, bytes)?;
        Ok(())
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let height =
            super::calculations::scaled_height((img.width(), img.height()), params.width);
        let thumb = img.resize_exact(params.width, height, FilterType::Lanczos3);
        let bytes = encode_jpeg(&thumb, params.quality, None)?;
        std::fs::write(&params.output, bytes)?;
        Ok(())
    }
}
