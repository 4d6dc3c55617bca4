//! Shared test utilities.
//!
//! Synthetic image fixtures plus a throwaway project root laid out the way
//! the stock config expects:
//!
//! ```text
//! <tmp>/
//! ├── photos/
//! └── templates/
//!     ├── default.html
//!     └── default.css
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let project = setup_project();
//! project.add_photos("my-trip", &["a.jpg", "b.jpg"]);
//! let backend = MockBackend::new();
//! let outcome = project.rebuilder(&backend).create("My Trip", None).unwrap();
//! assert_eq!(project.load_catalog().galleries.len(), 1);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::catalog::{Catalog, CatalogStore};
use crate::config::{Layout, OrcaConfig};
use crate::imaging::ImageBackend;
use crate::rebuild::Rebuilder;

pub const TEST_TEMPLATE_HTML: &str = "<!DOCTYPE html>\n\
<html>\n\
<head><title>${TITLE}</title><link rel=\"stylesheet\" href=\"styles.css\"></head>\n\
<body>\n\
<h1>${TITLE}</h1>\n\
<p class=\"date\">${PHOTO_DATE}</p>\n\
<div class=\"gallery\">\n${GALLERY}\n</div>\n\
</body>\n\
</html>\n";

pub const TEST_TEMPLATE_CSS: &str = "body { margin: 0; }\n";

// =========================================================================
// Image fixtures
// =========================================================================

/// Write a small gradient JPEG (no EXIF).
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

/// Write a small gradient PNG.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

fn gradient(width: u32, height: u32) -> image::RgbImage {
    image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

// =========================================================================
// Project fixture
// =========================================================================

/// A temp project root with stock config.
pub struct TestProject {
    pub tmp: TempDir,
    pub config: OrcaConfig,
}

/// Create a project with empty photos root and the default template.
pub fn setup_project() -> TestProject {
    let project = TestProject {
        tmp: TempDir::new().unwrap(),
        config: OrcaConfig::default(),
    };
    let layout = project.layout();
    fs::create_dir_all(&layout.photos_root).unwrap();
    project.add_template("default", TEST_TEMPLATE_HTML, Some(TEST_TEMPLATE_CSS));
    project
}

impl TestProject {
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn layout(&self) -> Layout {
        self.config.layout(self.root())
    }

    pub fn gallery_dir(&self, folder: &str) -> PathBuf {
        self.layout().photos_root.join(folder)
    }

    /// Create a gallery folder holding placeholder files (not decodable;
    /// use with a mock backend).
    pub fn add_photos(&self, folder: &str, names: &[&str]) -> PathBuf {
        let dir = self.gallery_dir(folder);
        fs::create_dir_all(&dir).unwrap();
        for name in names {
            fs::write(dir.join(name), b"not really an image").unwrap();
        }
        dir
    }

    /// Create a gallery folder holding real JPEGs of the given size.
    pub fn add_jpegs(&self, folder: &str, names: &[&str], size: (u32, u32)) -> PathBuf {
        let dir = self.gallery_dir(folder);
        fs::create_dir_all(&dir).unwrap();
        for name in names {
            create_test_jpeg(&dir.join(name), size.0, size.1);
        }
        dir
    }

    pub fn add_template(&self, name: &str, html: &str, css: Option<&str>) {
        let root = self.layout().templates_root;
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join(format!("{name}.html")), html).unwrap();
        if let Some(css) = css {
            fs::write(root.join(format!("{name}.css")), css).unwrap();
        }
    }

    pub fn rebuilder<'a, B: ImageBackend>(&self, backend: &'a B) -> Rebuilder<'a, B> {
        Rebuilder::new(backend, &self.config, self.root())
    }

    pub fn load_catalog(&self) -> Catalog {
        CatalogStore::new(self.layout().catalog).load()
    }

    /// Raw catalog file contents, `None` when it was never written.
    pub fn catalog_bytes(&self) -> Option<Vec<u8>> {
        fs::read(self.layout().catalog).ok()
    }
}
