//! Project configuration module.
//!
//! Handles loading, validating, and merging `orca.toml`. The file lives in the
//! project root (the directory holding the photos root, the templates root and
//! the catalog) and is entirely optional: stock defaults reproduce the
//! standard layout and encoding settings.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! photos = "photos"            # One sub-directory per gallery
//! templates = "templates"      # <name>.html + optional <name>.css
//! catalog = "galleries.json"   # The gallery catalog
//!
//! [photos]
//! max_width = 1920             # Optimized photos fit inside this box
//! max_height = 1080
//! quality = 85                 # JPEG quality (1-100)
//! density = 96                 # Pixel density written to the JPEG header (dpi)
//!
//! [thumbnails]
//! width = 300                  # Thumbnail width; height follows the photo
//! quality = 80
//!
//! [templates]
//! default = "default"          # Template used by `create` when none is given
//!
//! [processing]
//! max_processes = 4            # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [thumbnails]
//! width = 400
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{OptimizeConfig, Quality, ThumbnailConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILE: &str = "orca.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `orca.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrcaConfig {
    /// Locations of the photos root, templates root and catalog.
    pub paths: PathsConfig,
    /// Optimized full-size photo settings.
    pub photos: PhotosConfig,
    /// Thumbnail settings.
    pub thumbnails: ThumbnailsConfig,
    /// Template selection.
    pub templates: TemplatesConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl OrcaConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, quality) in [
            ("photos.quality", self.photos.quality),
            ("thumbnails.quality", self.thumbnails.quality),
        ] {
            if !(1..=100).contains(&quality) {
                return Err(ConfigError::Validation(format!("{key} must be 1-100")));
            }
        }
        if self.photos.max_width == 0 || self.photos.max_height == 0 {
            return Err(ConfigError::Validation(
                "photos.max_width and photos.max_height must be non-zero".into(),
            ));
        }
        if self.thumbnails.width == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.width must be non-zero".into(),
            ));
        }
        if self.templates.default.trim().is_empty() {
            return Err(ConfigError::Validation(
                "templates.default must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the configured paths against a project root.
    pub fn layout(&self, root: &Path) -> Layout {
        Layout {
            photos_root: root.join(&self.paths.photos),
            templates_root: root.join(&self.paths.templates),
            catalog: root.join(&self.paths.catalog),
        }
    }

    pub fn optimize_config(&self) -> OptimizeConfig {
        OptimizeConfig {
            max_width: self.photos.max_width,
            max_height: self.photos.max_height,
            quality: Quality::new(self.photos.quality),
            density: self.photos.density,
        }
    }

    pub fn thumbnail_config(&self) -> ThumbnailConfig {
        ThumbnailConfig {
            width: self.thumbnails.width,
            quality: Quality::new(self.thumbnails.quality),
        }
    }
}

/// Absolute-or-root-relative locations every operation works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub photos_root: PathBuf,
    pub templates_root: PathBuf,
    pub catalog: PathBuf,
}

/// Filesystem locations, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub photos: PathBuf,
    pub templates: PathBuf,
    pub catalog: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            photos: PathBuf::from("photos"),
            templates: PathBuf::from("templates"),
            catalog: PathBuf::from("galleries.json"),
        }
    }
}

/// Optimized photo settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotosConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u32,
    pub density: u16,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            quality: 85,
            density: 96,
        }
    }
}

/// Thumbnail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    pub width: u32,
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            width: 300,
            quality: 80,
        }
    }
}

/// Template selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Template used when `create` is called without one.
    pub default: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            default: "default".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(OrcaConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `orca.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<OrcaConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: OrcaConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `orca.toml` in the given project root.
pub fn load_config(root: &Path) -> Result<OrcaConfig, ConfigError> {
    resolve_config(load_raw_config(root)?)
}

/// Returns a fully-commented stock `orca.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Orca Gallery Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Locations (relative to the project root)
# ---------------------------------------------------------------------------
[paths]
# One sub-directory per gallery, named after the gallery's folder slug.
photos = "photos"

# Each template is <name>.html plus an optional <name>.css.
templates = "templates"

# The gallery catalog: the single source of truth for gallery ids.
catalog = "galleries.json"

# ---------------------------------------------------------------------------
# Optimized photos (regenerate-photos, create)
# ---------------------------------------------------------------------------
[photos]
# Photos are scaled down (never up) to fit inside this box.
max_width = 1920
max_height = 1080

# JPEG encoding quality (1 = worst, 100 = best).
quality = 85

# Pixel density stored in the JPEG header, in dots per inch.
density = 96

# ---------------------------------------------------------------------------
# Thumbnails (regenerate-thumbs, create)
# ---------------------------------------------------------------------------
[thumbnails]
# Thumbnail width in pixels; height keeps the photo's aspect ratio.
width = 300

# JPEG encoding quality (1 = worst, 100 = best).
quality = 80

# ---------------------------------------------------------------------------
# Templates
# ---------------------------------------------------------------------------
[templates]
# Template used by `create` when --template is not given.
default = "default"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
