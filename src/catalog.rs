//! The gallery catalog: one JSON document listing every gallery.
//!
//! The catalog is the sole authority on which galleries exist. A folder full
//! of photos without a record is not a gallery to anything but `create`.
//!
//! ## File format
//!
//! ```json
//! {
//!   "galleries": [
//!     {
//!       "id": "ORCA-1",
//!       "folder": "my-trip",
//!       "title": "My Trip",
//!       "createdAt": "2024-05-01T10:00:00Z",
//!       "referenceDate": "2024-04-28T16:12:03Z",
//!       "lastModifiedAt": "2024-05-01T10:00:00Z",
//!       "photoCount": 3,
//!       "template": "default"
//!     }
//!   ]
//! }
//! ```
//!
//! Keys are written in struct order with two-space indentation, so saving an
//! unchanged catalog is byte-for-byte stable.
//!
//! ## Durability
//!
//! The whole document is loaded, mutated in memory and rewritten. Saving goes
//! through a sibling temp file that is synced and then renamed over the
//! catalog, so a crash mid-write leaves the previous catalog intact.
//!
//! There is no locking: one writer at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix of every gallery id.
pub const ID_PREFIX: &str = "ORCA-";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryRecord {
    /// `ORCA-<n>`; never changes, never reused.
    pub id: String,
    /// Directory name under the photos root; never changes.
    pub folder: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Capture date of the first photo, shown on the gallery page.
    pub reference_date: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    /// Recognized images found by the most recent scan.
    pub photo_count: usize,
    /// Records written before templates were tracked have none.
    #[serde(default = "default_template_name")]
    pub template: String,
}

/// Template assumed for records that don't name one.
pub const DEFAULT_TEMPLATE: &str = "default";

fn default_template_name() -> String {
    DEFAULT_TEMPLATE.to_string()
}

/// The whole catalog document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub galleries: Vec<GalleryRecord>,
}

/// Numeric part of an id (`"ORCA-12"` → `12`), if it has our prefix.
pub fn id_number(id: &str) -> Option<u64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}

impl Catalog {
    /// The id the next created gallery receives: highest existing number + 1.
    ///
    /// Ids that don't carry the prefix or a number are ignored.
    pub fn next_id(&self) -> String {
        let max = self
            .galleries
            .iter()
            .filter_map(|g| id_number(&g.id))
            .max()
            .unwrap_or(0);
        format!("{}{}", ID_PREFIX, max + 1)
    }

    pub fn find(&self, id: &str) -> Option<&GalleryRecord> {
        self.galleries.iter().find(|g| g.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut GalleryRecord> {
        self.galleries.iter_mut().find(|g| g.id == id)
    }

    pub fn find_by_folder(&self, folder: &str) -> Option<&GalleryRecord> {
        self.galleries.iter().find(|g| g.folder == folder)
    }
}

/// Loads and saves the catalog file.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the catalog.
    ///
    /// A missing or unparsable file yields an empty catalog: a fresh project
    /// has no catalog yet, and that is not an error. An unparsable file is
    /// first moved aside to `<name>.corrupt` so the next save cannot
    /// overwrite it.
    pub fn load(&self) -> Catalog {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no catalog, starting empty");
                return Catalog::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(catalog) => catalog,
            Err(e) => {
                let aside = self.corrupt_path();
                match fs::rename(&self.path, &aside) {
                    Ok(()) => warn!(
                        path = %self.path.display(),
                        moved_to = %aside.display(),
                        error = %e,
                        "catalog is not valid, moved aside and starting empty"
                    ),
                    Err(rename_err) => warn!(
                        path = %self.path.display(),
                        error = %e,
                        rename_error = %rename_err,
                        "catalog is not valid and could not be moved aside, starting empty"
                    ),
                }
                Catalog::default()
            }
        }
    }

    /// Where an unparsable catalog is moved: `galleries.json.corrupt`.
    pub fn corrupt_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "catalog".into());
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    /// Write the whole catalog: temp file, fsync, rename.
    pub fn save(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| CatalogError::Io { path, source }
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let mut serialized = serde_json::to_string_pretty(catalog)?;
        serialized.push('\n');

        let temp_path = self.temp_path();
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(io_err(&temp_path))?;
            file.write_all(serialized.as_bytes())
                .map_err(io_err(&temp_path))?;
            file.sync_all().map_err(io_err(&temp_path))?;
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            fs::remove_file(&temp_path).ok();
            return Err(io_err(&self.path)(e));
        }
        debug!(path = %self.path.display(), galleries = catalog.galleries.len(), "catalog saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "catalog".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
    }
}
