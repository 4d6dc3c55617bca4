//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what each photo becomes) and the [`backend`](super::backend)
//! (which does the actual pixel work). Tests swap in a mock backend and assert
//! on these values without encoding a single pixel.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100). Clamped on construction.
//! - [`OptimizeParams`]: Re-encode a photo in place within a bounding box.
//! - [`ThumbnailParams`]: Write a fixed-width copy of a photo elsewhere.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Re-encode `path` in place, resized to `width`×`height`.
///
/// Width and height are already the final size: the bounding-box math happens
/// in [`calculations`](super::calculations) so backends never decide sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeParams {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    /// Pixel density written into the JPEG header, in dots per inch.
    pub density: u16,
}

/// Write a resized copy of `source` to `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Target width; height follows the source aspect ratio.
    pub width: u32,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(80).value(), 80);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_85() {
        assert_eq!(Quality::default().value(), 85);
    }
}
