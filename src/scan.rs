//! Photo discovery and in-place filename normalization.
//!
//! Every rebuild operation starts by looking at the gallery folder. Only the
//! top level counts, and only files whose extension is a recognized image
//! format (`.jpg`, `.jpeg`, `.png`, any case). Subdirectories (including
//! `thumbs/`), hidden files and everything else are ignored.
//!
//! ```text
//! photos/my-trip/
//! ├── Fotó Día 1.JPG     → renamed to foto_dia_1.jpg
//! ├── IMG 0002.jpeg      → renamed to img_0002.jpeg
//! ├── beach.png          (already normalized, untouched)
//! ├── notes.txt          (ignored)
//! ├── index.html         (ignored)
//! └── thumbs/            (ignored)
//! ```
//!
//! Listings are sorted by filename, so the "first photo" of a gallery is
//! stable across runs and machines.
//!
//! ## Renaming
//!
//! [`normalize_photos`] renames files in place. All targets are computed and
//! checked first: when two files would end up with the same name, nothing is
//! renamed and the scan fails. Because normalization is idempotent, a target
//! name can never belong to another file that is itself about to move, so
//! the renames can run in any order. Renames are not rolled back if a later
//! stage fails; running the operation again simply finds nothing to rename.

use crate::naming::normalize_filename;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Extensions of recognized images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Name of the thumbnail subdirectory inside a gallery folder.
pub const THUMBS_DIR: &str = "thumbs";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{first} and {second} in {} both normalize to {target}", .folder.display())]
    Collision {
        folder: PathBuf,
        first: String,
        second: String,
        target: String,
    },
}

/// One physical rename performed by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// Result of scanning a gallery folder.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Recognized images, sorted by filename, under their final names.
    pub photos: Vec<PathBuf>,
    /// Renames performed, in the order they happened.
    pub renames: Vec<Rename>,
}

/// Whether a filename carries a recognized image extension.
pub fn is_recognized_image(name: &str) -> bool {
    if name.starts_with('.') {
        return false;
    }
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Filenames of the recognized images directly inside `folder`, sorted.
fn recognized_names(folder: &Path) -> Result<Vec<String>, ScanError> {
    let io_err = |source| ScanError::Io {
        path: folder.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(folder).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.file_type().map_err(io_err)?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if is_recognized_image(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// List the recognized images in `folder` without renaming anything.
pub fn list_photos(folder: &Path) -> Result<Vec<PathBuf>, ScanError> {
    Ok(recognized_names(folder)?
        .into_iter()
        .map(|name| folder.join(name))
        .collect())
}

/// Compute the renames needed to normalize `names`.
///
/// Fails on the first pair of names that would collide. Names that are
/// already normalized produce no rename.
pub fn plan_renames(folder: &Path, names: &[String]) -> Result<Vec<Rename>, ScanError> {
    let mut targets: BTreeMap<String, &str> = BTreeMap::new();
    let mut renames = Vec::new();
    for name in names {
        let target = normalize_filename(name);
        if let Some(first) = targets.insert(target.clone(), name) {
            return Err(ScanError::Collision {
                folder: folder.to_path_buf(),
                first: first.to_string(),
                second: name.clone(),
                target,
            });
        }
        if target != *name {
            renames.push(Rename {
                from: name.clone(),
                to: target,
            });
        }
    }
    Ok(renames)
}

/// List the recognized images in `folder` and rename them to their
/// normalized names.
pub fn normalize_photos(folder: &Path) -> Result<ScanOutcome, ScanError> {
    let names = recognized_names(folder)?;
    let renames = plan_renames(folder, &names)?;

    for rename in &renames {
        let from = folder.join(&rename.from);
        let to = folder.join(&rename.to);
        fs::rename(&from, &to).map_err(|source| ScanError::Io { path: from, source })?;
        info!(folder = %folder.display(), from = %rename.from, to = %rename.to, "renamed photo");
    }

    let photos = if renames.is_empty() {
        names.into_iter().map(|n| folder.join(n)).collect()
    } else {
        list_photos(folder)?
    };
    Ok(ScanOutcome { photos, renames })
}
