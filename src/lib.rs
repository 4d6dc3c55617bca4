//! # Orca Gal
//!
//! A catalog-driven photo gallery builder. Drop photos into a folder, run
//! `create`, and you get optimized full-size photos, thumbnails and a static
//! HTML page rendered from a template, plus a record in the gallery catalog.
//!
//! # Project Layout
//!
//! ```text
//! project/
//! ├── orca.toml                    # Optional configuration
//! ├── galleries.json               # The catalog: one record per gallery
//! ├── templates/
//! │   ├── default.html             # ${TITLE}, ${PHOTO_DATE}, ${GALLERY}
//! │   └── default.css              # Copied to styles.css (optional)
//! └── photos/
//!     └── my-trip/                 # One folder per gallery
//!         ├── foto_dia_1.jpg       # Normalized, optimized in place
//!         ├── thumbs/
//!         │   └── foto_dia_1.jpg   # 300px wide
//!         ├── index.html
//!         └── styles.css
//! ```
//!
//! # Architecture: One State Machine, Five Operations
//!
//! Every operation (create, regenerate photos, regenerate thumbnails,
//! regenerate HTML, change template) runs the same phases:
//!
//! ```text
//! Validate → Scan → Transform → Render → Persist
//! ```
//!
//! The catalog is read before Validate and written only in Persist, so a
//! failed operation never leaves a half-updated catalog behind. See
//! [`rebuild`] for the per-operation rules.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`rebuild`] | The operations and their phase state machine |
//! | [`catalog`] | `galleries.json` load/save, id assignment |
//! | [`scan`] | Photo listing and in-place filename normalization |
//! | [`imaging`] | Pure-Rust image operations: identify, optimize, thumbnail, EXIF dates |
//! | [`generate`] | Template rendering into `index.html` |
//! | [`metadata`] | Gallery reference date: EXIF first, file time as fallback |
//! | [`naming`] | Filename normalization and title → folder slug |
//! | [`config`] | `orca.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Catalog Is the Source of Truth
//!
//! A gallery exists when the catalog says so. Ids (`ORCA-1`, `ORCA-2`, ...)
//! are assigned as the highest existing number plus one, so deleting a record
//! never causes an id to be handed out twice while a higher one survives.
//! Saves go through a temp file and a rename.
//!
//! ## Idempotent Steps Instead of Rollback
//!
//! Renames and re-encodes are not undone when a later phase fails. Instead,
//! every step converges: normalizing an already-normalized name is a no-op,
//! and re-optimizing a photo that already fits the box keeps its size. Running
//! a failed operation again finishes the job.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate (Lanczos3 resampling, JPEG
//! encoding with pixel density) and `kamadak-exif`. No system libraries,
//! no external processes.

pub mod catalog;
pub mod config;
pub mod generate;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod rebuild;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
