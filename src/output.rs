//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Progress (while an operation runs)
//!
//! ```text
//! ==> create: validate
//! ==> create: scan
//!     Fotó 1.JPG → foto_1.jpg
//! ==> create: transform
//!     foto_1.jpg (1440x1080)
//!     thumbs/foto_1.jpg
//! ==> create: render
//! ==> create: persist
//!     Catalog: galleries.json
//! ```
//!
//! ## Result
//!
//! ```text
//! Created ORCA-1 My Trip (3 photos)
//!     Folder: my-trip
//!     Template: default
//!     Date: 2024-04-28
//!     Page: photos/my-trip/index.html
//! ```
//!
//! ## List
//!
//! ```text
//! ORCA-1 My Trip (3 photos)
//!     Folder: my-trip
//!     Template: default
//!     Date: 2024-04-28
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::catalog::{Catalog, GalleryRecord};
use crate::metadata::format_reference_date;
use crate::rebuild::{Operation, RebuildEvent, RebuildOutcome};
use crate::scan::THUMBS_DIR;
use std::path::{Path, PathBuf};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Gallery header: id, title and photo count.
///
/// ```text
/// ORCA-1 My Trip (3 photos)
/// ```
fn gallery_header(record: &GalleryRecord) -> String {
    format!("{} {} ({} photos)", record.id, record.title, record.photo_count)
}

/// Indented context lines shared by results and listings.
fn gallery_details(record: &GalleryRecord) -> Vec<String> {
    vec![
        format!("{}Folder: {}", indent(1), record.folder),
        format!("{}Template: {}", indent(1), record.template),
        format!(
            "{}Date: {}",
            indent(1),
            format_reference_date(&record.reference_date)
        ),
    ]
}

/// Show `path` relative to `root` when it lives under it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Progress
// ============================================================================

/// Format a single rebuild progress event as display lines.
pub fn format_rebuild_event(event: &RebuildEvent, root: &Path) -> Vec<String> {
    match event {
        RebuildEvent::PhaseStarted { operation, phase } => {
            vec![format!("==> {}: {}", operation, phase)]
        }
        RebuildEvent::PhotoRenamed { from, to } => {
            vec![format!("{}{} \u{2192} {}", indent(1), from, to)]
        }
        RebuildEvent::PhotoOptimized {
            filename,
            width,
            height,
        } => vec![format!("{}{} ({}x{})", indent(1), filename, width, height)],
        RebuildEvent::ThumbnailWritten { filename } => {
            vec![format!("{}{}/{}", indent(1), THUMBS_DIR, filename)]
        }
        RebuildEvent::StylesheetMissing { template } => vec![format!(
            "{}Stylesheet: {}.css not found, page has no styles.css",
            indent(1),
            template
        )],
        RebuildEvent::CatalogSaved { path } => {
            vec![format!("{}Catalog: {}", indent(1), display_path(path, root))]
        }
    }
}

pub fn print_rebuild_event(event: &RebuildEvent, root: &Path) {
    for line in format_rebuild_event(event, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Result
// ============================================================================

fn verb(operation: Operation) -> &'static str {
    match operation {
        Operation::Create => "Created",
        Operation::RegeneratePhotos => "Regenerated photos of",
        Operation::RegenerateThumbnails => "Regenerated thumbnails of",
        Operation::RegenerateHtml => "Regenerated page of",
        Operation::ChangeTemplate => "Changed template of",
    }
}

/// Format the confirmation printed after a successful operation.
pub fn format_outcome(outcome: &RebuildOutcome, root: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}",
        verb(outcome.operation),
        gallery_header(&outcome.record)
    )];
    lines.extend(gallery_details(&outcome.record));
    if outcome.renamed > 0 {
        lines.push(format!("{}Renamed: {} files", indent(1), outcome.renamed));
    }
    lines.push(format!(
        "{}Page: {}",
        indent(1),
        display_path(&outcome.page, root)
    ));
    if !outcome.stylesheet_copied {
        lines.push(format!("{}Stylesheet: none", indent(1)));
    }
    lines
}

pub fn print_outcome(outcome: &RebuildOutcome, root: &Path) {
    for line in format_outcome(outcome, root) {
        println!("{}", line);
    }
}

// ============================================================================
// List
// ============================================================================

/// Format every catalog record, in catalog order.
pub fn format_catalog_list(catalog: &Catalog) -> Vec<String> {
    if catalog.galleries.is_empty() {
        return vec!["No galleries".to_string()];
    }
    let mut lines = Vec::new();
    for record in &catalog.galleries {
        lines.push(gallery_header(record));
        lines.extend(gallery_details(record));
    }
    lines
}

pub fn print_catalog_list(catalog: &Catalog) {
    for line in format_catalog_list(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// Init
// ============================================================================

/// Format the files and directories created by `init`.
pub fn format_init_output(created: &[PathBuf], root: &Path) -> Vec<String> {
    if created.is_empty() {
        return vec!["Nothing to do, project already initialized".to_string()];
    }
    created
        .iter()
        .map(|p| format!("Created {}", display_path(p, root)))
        .collect()
}

pub fn print_init_output(created: &[PathBuf], root: &Path) {
    for line in format_init_output(created, root) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rebuild::Phase;
    use chrono::{TimeZone, Utc};

    fn record() -> GalleryRecord {
        let at = Utc.with_ymd_and_hms(2024, 4, 28, 16, 12, 3).unwrap();
        GalleryRecord {
            id: "ORCA-1".to_string(),
            folder: "my-trip".to_string(),
            title: "My Trip".to_string(),
            created_at: at,
            reference_date: at,
            last_modified_at: at,
            photo_count: 3,
            template: "default".to_string(),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn display_path_strips_root() {
        assert_eq!(
            display_path(Path::new("/p/photos/a/index.html"), Path::new("/p")),
            "photos/a/index.html"
        );
        assert_eq!(
            display_path(Path::new("/elsewhere/x"), Path::new("/p")),
            "/elsewhere/x"
        );
    }

    // =========================================================================
    // Events
    // =========================================================================

    #[test]
    fn format_phase_started() {
        let event = RebuildEvent::PhaseStarted {
            operation: Operation::RegenerateThumbnails,
            phase: Phase::Transform,
        };
        assert_eq!(
            format_rebuild_event(&event, Path::new("/")),
            vec!["==> regenerate-thumbs: transform"]
        );
    }

    #[test]
    fn format_renamed_and_transformed() {
        let root = Path::new("/p");
        let renamed = RebuildEvent::PhotoRenamed {
            from: "Fotó 1.JPG".to_string(),
            to: "foto_1.jpg".to_string(),
        };
        let optimized = RebuildEvent::PhotoOptimized {
            filename: "foto_1.jpg".to_string(),
            width: 1440,
            height: 1080,
        };
        let thumb = RebuildEvent::ThumbnailWritten {
            filename: "foto_1.jpg".to_string(),
        };

        assert_eq!(
            format_rebuild_event(&renamed, root),
            vec!["    Fotó 1.JPG \u{2192} foto_1.jpg"]
        );
        assert_eq!(
            format_rebuild_event(&optimized, root),
            vec!["    foto_1.jpg (1440x1080)"]
        );
        assert_eq!(
            format_rebuild_event(&thumb, root),
            vec!["    thumbs/foto_1.jpg"]
        );
    }

    #[test]
    fn format_catalog_saved_is_root_relative() {
        let event = RebuildEvent::CatalogSaved {
            path: PathBuf::from("/p/galleries.json"),
        };
        assert_eq!(
            format_rebuild_event(&event, Path::new("/p")),
            vec!["    Catalog: galleries.json"]
        );
    }

    // =========================================================================
    // Outcome
    // =========================================================================

    #[test]
    fn format_create_outcome() {
        let outcome = RebuildOutcome {
            operation: Operation::Create,
            record: record(),
            photos: 3,
            renamed: 2,
            page: PathBuf::from("/p/photos/my-trip/index.html"),
            stylesheet_copied: true,
            catalog_saved: true,
        };
        assert_eq!(
            format_outcome(&outcome, Path::new("/p")),
            vec![
                "Created ORCA-1 My Trip (3 photos)",
                "    Folder: my-trip",
                "    Template: default",
                "    Date: 2024-04-28",
                "    Renamed: 2 files",
                "    Page: photos/my-trip/index.html",
            ]
        );
    }

    #[test]
    fn format_outcome_flags_missing_stylesheet() {
        let outcome = RebuildOutcome {
            operation: Operation::ChangeTemplate,
            record: record(),
            photos: 3,
            renamed: 0,
            page: PathBuf::from("/p/photos/my-trip/index.html"),
            stylesheet_copied: false,
            catalog_saved: true,
        };
        let lines = format_outcome(&outcome, Path::new("/p"));
        assert_eq!(lines[0], "Changed template of ORCA-1 My Trip (3 photos)");
        assert_eq!(lines.last().unwrap(), "    Stylesheet: none");
        assert!(!lines.iter().any(|l| l.contains("Renamed")));
    }

    // =========================================================================
    // List / init
    // =========================================================================

    #[test]
    fn format_empty_catalog() {
        assert_eq!(format_catalog_list(&Catalog::default()), vec!["No galleries"]);
    }

    #[test]
    fn format_catalog_lists_each_gallery() {
        let mut second = record();
        second.id = "ORCA-2".to_string();
        second.title = "Beach".to_string();
        second.photo_count = 12;
        let catalog = Catalog {
            galleries: vec![record(), second],
        };

        let lines = format_catalog_list(&catalog);
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "ORCA-1 My Trip (3 photos)");
        assert_eq!(lines[4], "ORCA-2 Beach (12 photos)");
    }

    #[test]
    fn format_init_lists_created_paths() {
        let root = Path::new("/p");
        assert_eq!(
            format_init_output(&[PathBuf::from("/p/templates/default.html")], root),
            vec!["Created templates/default.html"]
        );
        assert_eq!(
            format_init_output(&[], root),
            vec!["Nothing to do, project already initialized"]
        );
    }
}
