//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::fit_within;
use super::params::{OptimizeParams, Quality, ThumbnailParams};
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Configuration for in-place photo optimization.
#[derive(Debug, Clone)]
pub struct OptimizeConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
    pub density: u16,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            quality: Quality::new(85),
            density: 96,
        }
    }
}

/// Plan an optimize operation without executing it.
pub fn plan_optimize(path: &Path, original: (u32, u32), config: &OptimizeConfig) -> OptimizeParams {
    let (width, height) = fit_within(original, (config.max_width, config.max_height));
    OptimizeParams {
        path: path.to_path_buf(),
        width,
        height,
        quality: config.quality,
        density: config.density,
    }
}

/// Re-encode a photo in place within the configured bounding box.
///
/// Returns the dimensions the photo has afterwards.
pub fn optimize_photo(
    backend: &impl ImageBackend,
    path: &Path,
    config: &OptimizeConfig,
) -> Result<(u32, u32)> {
    let original = get_dimensions(backend, path)?;
    let params = plan_optimize(path, original, config);
    backend.optimize(&params)?;
    Ok((params.width, params.height))
}

/// Configuration for thumbnail generation.
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    pub width: u32,
    pub quality: Quality,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 300,
            quality: Quality::new(80),
        }
    }
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(source: &Path, output: &Path, config: &ThumbnailConfig) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width: config.width,
        quality: config.quality,
    }
}

/// Create the thumbnail for `source` in `thumbs_dir`, keeping its filename.
///
/// Returns the path written.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    thumbs_dir: &Path,
    config: &ThumbnailConfig,
) -> Result<PathBuf> {
    let filename = source.file_name().ok_or_else(|| {
        BackendError::ProcessingFailed(format!("Not a file path: {}", source.display()))
    })?;
    let output = thumbs_dir.join(filename);
    backend.thumbnail(&plan_thumbnail(source, &output, config))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    #[test]
    fn get_dimensions_calls_backend() {
        let backend = MockBackend::with_dimensions(Dimensions {
            width: 1920,
            height: 1080,
        });

        let dims = get_dimensions(&backend, Path::new("/test.jpg")).unwrap();
        assert_eq!(dims, (1920, 1080));
    }

    #[test]
    fn plan_optimize_uses_fixed_encoding_settings() {
        let params = plan_optimize(
            Path::new("/g/a.jpg"),
            (4000, 3000),
            &OptimizeConfig::default(),
        );
        assert_eq!((params.width, params.height), (1440, 1080));
        assert_eq!(params.quality.value(), 85);
        assert_eq!(params.density, 96);
    }

    #[test]
    fn optimize_photo_identifies_then_reencodes() {
        let backend = MockBackend::with_dimensions(Dimensions {
            width: 3000,
            height: 1000,
        });

        let dims =
            optimize_photo(&backend, Path::new("/g/pano.jpg"), &OptimizeConfig::default()).unwrap();
        assert_eq!(dims, (1920, 640));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], RecordedOp::Identify(_)));
        assert!(matches!(
            &ops[1],
            RecordedOp::Optimize { path, width: 1920, height: 640, .. } if path == "/g/pano.jpg"
        ));
    }

    #[test]
    fn optimize_photo_small_source_keeps_size() {
        let backend = MockBackend::with_dimensions(Dimensions {
            width: 640,
            height: 480,
        });
        let dims =
            optimize_photo(&backend, Path::new("/g/small.jpg"), &OptimizeConfig::default()).unwrap();
        assert_eq!(dims, (640, 480));
    }

    #[test]
    fn create_thumbnail_keeps_filename() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = MockBackend::new();

        let out = create_thumbnail(
            &backend,
            Path::new("/g/foto_1.jpg"),
            tmp.path(),
            &ThumbnailConfig::default(),
        )
        .unwrap();

        assert_eq!(out, tmp.path().join("foto_1.jpg"));
        let ops = backend.get_operations();
        assert!(matches!(
            &ops[0],
            RecordedOp::Thumbnail { width: 300, quality: 80, .. }
        ));
    }
}
