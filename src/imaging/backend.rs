//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations every backend must
//! support: identify, read_metadata, optimize, and thumbnail.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pure Rust decoding and
//! encoding through the `image` crate, EXIF through `kamadak-exif`.

use super::params::{OptimizeParams, ThumbnailParams};
use chrono::NaiveDateTime;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Capture-related EXIF timestamps of a photo.
///
/// Field mapping (EXIF tag → field):
/// - `DateTimeOriginal` (`0x9003`) → `original`
/// - `DateTimeDigitized` (`0x9004`, "CreateDate" in most tools) → `created`
/// - `DateTime` (`0x0132`, "ModifyDate") → `modified`
///
/// EXIF timestamps carry no zone, so they stay naive here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub original: Option<NaiveDateTime>,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
}

/// Trait for image processing backends.
///
/// `Sync` because transforms fan out over a rayon pool.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Read embedded EXIF dates. Missing or corrupt EXIF is an error; callers
    /// decide how to fall back.
    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata, BackendError>;

    /// Re-encode a photo in place.
    fn optimize(&self, params: &OptimizeParams) -> Result<(), BackendError>;

    /// Write a resized copy of a photo.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}
