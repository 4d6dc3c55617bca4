//! Reference-date resolution for a gallery.
//!
//! A gallery's reference date is the capture date of its first photo (first
//! in the normalized, sorted listing). It is resolved once, at creation, and
//! rendered on the gallery page as `YYYY-MM-DD`.
//!
//! ## Resolution priority
//!
//! The first present value wins:
//!
//! ```text
//! EXIF DateTimeOriginal → EXIF DateTimeDigitized → EXIF DateTime
//!     → filesystem modification time → now
//! ```
//!
//! Resolution never fails. Corrupt or absent EXIF falls through to the file's
//! mtime, and a file that cannot even be stat'ed falls through to the current
//! time, so a gallery always gets a date.
//!
//! EXIF timestamps have no zone. They are taken as UTC, which keeps the
//! rendered date identical on every machine that renders the gallery.

use crate::imaging::{ImageBackend, ImageMetadata};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::Path;
use tracing::debug;

/// Where a resolved reference date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    ExifOriginal,
    ExifCreated,
    ExifModified,
    FileModified,
    Now,
}

/// Pick the first present EXIF date in priority order.
pub fn first_exif_date(meta: &ImageMetadata) -> Option<(NaiveDateTime, DateSource)> {
    [
        (meta.original, DateSource::ExifOriginal),
        (meta.created, DateSource::ExifCreated),
        (meta.modified, DateSource::ExifModified),
    ]
    .into_iter()
    .find_map(|(date, source)| date.map(|d| (d, source)))
}

/// Resolve the reference date of a photo, reporting where it came from.
pub fn resolve_reference_date_with_source(
    backend: &impl ImageBackend,
    photo: &Path,
) -> (DateTime<Utc>, DateSource) {
    match backend.read_metadata(photo) {
        Ok(meta) => {
            if let Some((naive, source)) = first_exif_date(&meta) {
                return (naive.and_utc(), source);
            }
            debug!(photo = %photo.display(), "no EXIF date tags, using file time");
        }
        Err(e) => debug!(photo = %photo.display(), error = %e, "EXIF unreadable, using file time"),
    }

    match std::fs::metadata(photo).and_then(|m| m.modified()) {
        Ok(mtime) => (DateTime::<Utc>::from(mtime), DateSource::FileModified),
        Err(_) => (Utc::now(), DateSource::Now),
    }
}

/// Resolve the reference date of a photo. Never fails.
pub fn resolve_reference_date(backend: &impl ImageBackend, photo: &Path) -> DateTime<Utc> {
    resolve_reference_date_with_source(backend, photo).0
}

/// Format a reference date the way gallery pages show it.
pub fn format_reference_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}
