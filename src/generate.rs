//! Gallery page rendering.
//!
//! A gallery page is a user-supplied HTML template with three tokens filled
//! in. Templates live in the templates root as `<name>.html` with an optional
//! `<name>.css` next to it:
//!
//! ```text
//! templates/
//! ├── default.html
//! ├── default.css
//! └── dark.html          # no stylesheet: rendering still succeeds
//! ```
//!
//! ## Tokens
//!
//! | Token | Replaced with |
//! |---|---|
//! | `${TITLE}` | Gallery title, HTML-escaped |
//! | `${PHOTO_DATE}` | Reference date as `YYYY-MM-DD` |
//! | `${GALLERY}` | One link per photo, in listing order |
//!
//! Every occurrence of every token is replaced in a single pass, so a title
//! that happens to contain a token is not expanded a second time. Anything
//! else of the form `${...}` is left as is.
//!
//! ## Photo markup
//!
//! Each photo becomes a PhotoSwipe-ready link to the full-size image wrapping
//! its lazy-loaded thumbnail:
//!
//! ```html
//! <a href="foto_1.jpg" data-pswp-width="1440" data-pswp-height="1080"
//!    target="_blank" data-download-url="foto_1.jpg">
//!   <img src="thumbs/foto_1.jpg" alt="My Trip - Photo 1" loading="lazy">
//! </a>
//! ```
//!
//! The width and height are read from the photo file as it is on disk when
//! rendering, so a render after optimization advertises the optimized size.
//!
//! ## Output
//!
//! `index.html` is written into the gallery folder and the template's
//! stylesheet is copied to `styles.css`. A missing or unreadable stylesheet
//! is logged and reported but never fails the render.

use crate::imaging::{BackendError, ImageBackend, get_dimensions};
use crate::metadata::format_reference_date;
use crate::scan::THUMBS_DIR;
use chrono::{DateTime, Utc};
use maud::{Markup, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const TITLE_TOKEN: &str = "${TITLE}";
pub const DATE_TOKEN: &str = "${PHOTO_DATE}";
pub const GALLERY_TOKEN: &str = "${GALLERY}";

/// Rendered page filename inside a gallery folder.
pub const PAGE_FILE: &str = "index.html";
/// Stylesheet filename inside a gallery folder.
pub const STYLESHEET_FILE: &str = "styles.css";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("template '{name}' not found (expected {})", .path.display())]
    TemplateNotFound { name: String, path: PathBuf },
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Files that make up a named template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFiles {
    pub html: PathBuf,
    pub css: PathBuf,
}

/// Whether `name` can be used as a template name.
///
/// Names are plain file stems: no separators, no parent references.
pub fn is_valid_template_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && !name.starts_with('.')
}

/// Locate the files of template `name`. The HTML file must exist; the
/// stylesheet is optional and not checked here.
pub fn resolve_template(templates_root: &Path, name: &str) -> Result<TemplateFiles, GenerateError> {
    let html = templates_root.join(format!("{}.html", name));
    if !is_valid_template_name(name) || !html.is_file() {
        return Err(GenerateError::TemplateNotFound {
            name: name.to_string(),
            path: html,
        });
    }
    Ok(TemplateFiles {
        css: templates_root.join(format!("{}.css", name)),
        html,
    })
}

/// Stock template installed by `init`.
pub const STOCK_TEMPLATE_HTML: &str = include_str!("../static/default.html");
pub const STOCK_TEMPLATE_CSS: &str = include_str!("../static/default.css");

/// Write the stock template into `templates_root` as `<name>.html` and
/// `<name>.css`. Files that already exist are left alone.
///
/// Returns the files actually written.
pub fn install_stock_template(
    templates_root: &Path,
    name: &str,
) -> Result<Vec<PathBuf>, GenerateError> {
    if !is_valid_template_name(name) {
        return Err(GenerateError::TemplateNotFound {
            name: name.to_string(),
            path: templates_root.join(name),
        });
    }
    fs::create_dir_all(templates_root).map_err(|source| GenerateError::Io {
        path: templates_root.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for (ext, content) in [("html", STOCK_TEMPLATE_HTML), ("css", STOCK_TEMPLATE_CSS)] {
        let path = templates_root.join(format!("{}.{}", name, ext));
        if path.exists() {
            debug!(path = %path.display(), "template file exists, keeping it");
            continue;
        }
        fs::write(&path, content).map_err(|source| GenerateError::Io {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }
    Ok(written)
}

/// Values substituted into a template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateValues<'a> {
    /// Already escaped.
    pub title: &'a str,
    pub date: &'a str,
    pub gallery: &'a str,
}

/// Replace every token occurrence in one pass.
pub fn fill_template(template: &str, values: &TemplateValues) -> String {
    let tokens = [
        (TITLE_TOKEN, values.title),
        (DATE_TOKEN, values.date),
        (GALLERY_TOKEN, values.gallery),
    ];

    let mut out = String::with_capacity(template.len() + values.gallery.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tokens.iter().find(|(token, _)| tail.starts_with(token)) {
            Some((token, value)) => {
                out.push_str(value);
                rest = &tail[token.len()..];
            }
            None => {
                out.push_str("${");
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// HTML-escape text for insertion into a template.
pub fn escape_text(text: &str) -> String {
    html! { (text) }.into_string()
}

/// A photo as it appears on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoEntry {
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// Markup for one photo. `number` is 1-based.
pub fn render_photo(photo: &PhotoEntry, title: &str, number: usize) -> Markup {
    let thumb = format!("{}/{}", THUMBS_DIR, photo.filename);
    let alt = format!("{} - Photo {}", title, number);
    html! {
        a href=(photo.filename)
            data-pswp-width=(photo.width)
            data-pswp-height=(photo.height)
            target="_blank"
            data-download-url=(photo.filename) {
            img src=(thumb) alt=(alt) loading="lazy";
        }
    }
}

/// Markup for all photos, one per line. `title` is raw text.
pub fn render_photos(photos: &[PhotoEntry], title: &str) -> String {
    photos
        .iter()
        .enumerate()
        .map(|(i, photo)| render_photo(photo, title, i + 1).into_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read the on-disk dimensions of every photo.
pub fn photo_entries(
    backend: &impl ImageBackend,
    photos: &[PathBuf],
) -> Result<Vec<PhotoEntry>, GenerateError> {
    photos
        .iter()
        .map(|path| {
            let (width, height) =
                get_dimensions(backend, path).map_err(|source| GenerateError::Image {
                    path: path.clone(),
                    source,
                })?;
            Ok(PhotoEntry {
                filename: path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                width,
                height,
            })
        })
        .collect()
}

/// Everything needed to render one gallery page.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub templates_root: &'a Path,
    pub template: &'a str,
    pub folder: &'a Path,
    pub photos: &'a [PathBuf],
    pub title: &'a str,
    pub reference_date: &'a DateTime<Utc>,
}

/// What a render wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub page: PathBuf,
    /// False when the template has no usable stylesheet.
    pub stylesheet_copied: bool,
}

/// Render `index.html` for a gallery and copy the template stylesheet.
///
/// Identical inputs produce a byte-identical page.
pub fn render_gallery(
    backend: &impl ImageBackend,
    request: &RenderRequest,
) -> Result<RenderOutcome, GenerateError> {
    let files = resolve_template(request.templates_root, request.template)?;
    let template = fs::read_to_string(&files.html).map_err(|source| GenerateError::Io {
        path: files.html.clone(),
        source,
    })?;
    let stylesheet_copied = copy_stylesheet(&files.css, &request.folder.join(STYLESHEET_FILE));

    let entries = photo_entries(backend, request.photos)?;
    let title = escape_text(request.title);
    let date = format_reference_date(request.reference_date);
    let gallery = render_photos(&entries, request.title);

    let page_html = fill_template(
        &template,
        &TemplateValues {
            title: &title,
            date: &date,
            gallery: &gallery,
        },
    );

    let page = request.folder.join(PAGE_FILE);
    fs::write(&page, page_html).map_err(|source| GenerateError::Io {
        path: page.clone(),
        source,
    })?;
    debug!(page = %page.display(), photos = entries.len(), "page rendered");

    Ok(RenderOutcome {
        page,
        stylesheet_copied,
    })
}

fn copy_stylesheet(source: &Path, dest: &Path) -> bool {
    match fs::copy(source, dest) {
        Ok(_) => true,
        Err(e) => {
            warn!(stylesheet = %source.display(), error = %e, "stylesheet not copied");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::imaging::backend::tests::MockBackend;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn values<'a>(title: &'a str, date: &'a str, gallery: &'a str) -> TemplateValues<'a> {
        TemplateValues {
            title,
            date,
            gallery,
        }
    }

    fn write_template(root: &Path, name: &str, html: &str, css: Option<&str>) {
        fs::create_dir_all(root).unwrap();
        fs::write(root.join(format!("{name}.html")), html).unwrap();
        if let Some(css) = css {
            fs::write(root.join(format!("{name}.css")), css).unwrap();
        }
    }

    // =========================================================================
    // Token substitution
    // =========================================================================

    #[test]
    fn fill_replaces_every_occurrence() {
        let out = fill_template(
            "<title>${TITLE}</title><h1>${TITLE}</h1><p>${PHOTO_DATE}</p>${GALLERY}",
            &values("Trip", "2024-01-02", "<a></a>"),
        );
        assert_eq!(
            out,
            "<title>Trip</title><h1>Trip</h1><p>2024-01-02</p><a></a>"
        );
    }

    #[test]
    fn fill_leaves_unknown_tokens() {
        let out = fill_template("${OTHER} $ ${ ${TITLE}", &values("T", "d", "g"));
        assert_eq!(out, "${OTHER} $ ${ T");
    }

    #[test]
    fn fill_does_not_expand_substituted_values() {
        let out = fill_template("${TITLE}|${GALLERY}", &values("${GALLERY}", "d", "photos"));
        assert_eq!(out, "${GALLERY}|photos");
    }

    #[test]
    fn escape_text_escapes_markup() {
        assert_eq!(escape_text("Tom & <Jerry>"), "Tom &amp; &lt;Jerry&gt;");
    }

    // =========================================================================
    // Photo markup
    // =========================================================================

    #[test]
    fn photo_markup_links_full_size_and_thumbnail() {
        let photo = PhotoEntry {
            filename: "foto_1.jpg".to_string(),
            width: 1440,
            height: 1080,
        };
        let html = render_photo(&photo, "My Trip", 1).into_string();

        assert!(html.starts_with("<a href=\"foto_1.jpg\""));
        assert!(html.contains("data-pswp-width=\"1440\""));
        assert!(html.contains("data-pswp-height=\"1080\""));
        assert!(html.contains("target=\"_blank\""));
        assert!(html.contains("data-download-url=\"foto_1.jpg\""));
        assert!(html.contains("src=\"thumbs/foto_1.jpg\""));
        assert!(html.contains("alt=\"My Trip - Photo 1\""));
        assert!(html.contains("loading=\"lazy\""));
        assert!(html.ends_with("</a>"));
    }

    #[test]
    fn photos_are_numbered_in_order() {
        let photos: Vec<PhotoEntry> = ["a.jpg", "b.jpg", "c.jpg"]
            .iter()
            .map(|f| PhotoEntry {
                filename: f.to_string(),
                width: 10,
                height: 10,
            })
            .collect();
        let html = render_photos(&photos, "T");

        assert_eq!(html.lines().count(), 3);
        assert!(html.lines().nth(2).unwrap().contains("T - Photo 3"));
        assert!(html.lines().nth(2).unwrap().contains("c.jpg"));
    }

    // =========================================================================
    // Template resolution
    // =========================================================================

    #[test]
    fn template_names_reject_paths() {
        assert!(is_valid_template_name("default"));
        assert!(is_valid_template_name("dark-v2"));
        assert!(!is_valid_template_name(""));
        assert!(!is_valid_template_name("../secret"));
        assert!(!is_valid_template_name("a/b"));
        assert!(!is_valid_template_name("a\\b"));
        assert!(!is_valid_template_name(".hidden"));
    }

    #[test]
    fn resolve_missing_template_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            resolve_template(tmp.path(), "nope"),
            Err(GenerateError::TemplateNotFound { ref name, .. }) if name == "nope"
        ));
    }

    #[test]
    fn resolve_traversal_errors_even_if_file_exists() {
        let tmp = TempDir::new().unwrap();
        let templates = tmp.path().join("templates");
        write_template(tmp.path(), "outside", "x", None);
        fs::create_dir_all(&templates).unwrap();

        assert!(resolve_template(&templates, "../outside").is_err());
    }

    // =========================================================================
    // Stock template
    // =========================================================================

    #[test]
    fn stock_template_has_every_token() {
        for token in [TITLE_TOKEN, DATE_TOKEN, GALLERY_TOKEN] {
            assert!(STOCK_TEMPLATE_HTML.contains(token), "missing {token}");
        }
    }

    #[test]
    fn install_writes_pair_then_keeps_existing() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("templates");

        let written = install_stock_template(&root, "default").unwrap();
        assert_eq!(written, vec![root.join("default.html"), root.join("default.css")]);
        assert!(resolve_template(&root, "default").is_ok());

        fs::write(root.join("default.css"), "custom").unwrap();
        assert!(install_stock_template(&root, "default").unwrap().is_empty());
        assert_eq!(fs::read_to_string(root.join("default.css")).unwrap(), "custom");
    }

    #[test]
    fn install_rejects_bad_name() {
        let tmp = TempDir::new().unwrap();
        assert!(install_stock_template(tmp.path(), "../x").is_err());
    }

    // =========================================================================
    // render_gallery()
    // =========================================================================

    struct Fixture {
        _tmp: TempDir,
        templates: PathBuf,
        folder: PathBuf,
        photos: Vec<PathBuf>,
    }

    fn fixture(css: Option<&str>) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let templates = tmp.path().join("templates");
        write_template(
            &templates,
            "default",
            "<h1>${TITLE}</h1><time>${PHOTO_DATE}</time>\n${GALLERY}\n",
            css,
        );
        let folder = tmp.path().join("my-trip");
        fs::create_dir_all(&folder).unwrap();
        let photos = vec![folder.join("a.jpg"), folder.join("b.jpg")];
        Fixture {
            _tmp: tmp,
            templates,
            folder,
            photos,
        }
    }

    fn request<'a>(f: &'a Fixture, date: &'a DateTime<Utc>) -> RenderRequest<'a> {
        RenderRequest {
            templates_root: &f.templates,
            template: "default",
            folder: &f.folder,
            photos: &f.photos,
            title: "Sun & Sea",
            reference_date: date,
        }
    }

    #[test]
    fn render_writes_page_and_stylesheet() {
        let f = fixture(Some("body { margin: 0 }"));
        let date = Utc.with_ymd_and_hms(2024, 4, 28, 16, 12, 3).unwrap();
        let backend = MockBackend::with_dimensions(Dimensions {
            width: 1440,
            height: 1080,
        });

        let outcome = render_gallery(&backend, &request(&f, &date)).unwrap();

        assert!(outcome.stylesheet_copied);
        assert_eq!(
            fs::read_to_string(f.folder.join(STYLESHEET_FILE)).unwrap(),
            "body { margin: 0 }"
        );
        let page = fs::read_to_string(&outcome.page).unwrap();
        assert!(page.starts_with("<h1>Sun &amp; Sea</h1><time>2024-04-28</time>"));
        assert_eq!(page.matches("<a href=").count(), 2);
        assert!(page.contains("alt=\"Sun &amp; Sea - Photo 2\""));
        assert!(page.contains("data-pswp-width=\"1440\""));
    }

    #[test]
    fn render_without_stylesheet_still_succeeds() {
        let f = fixture(None);
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let outcome = render_gallery(&MockBackend::new(), &request(&f, &date)).unwrap();

        assert!(!outcome.stylesheet_copied);
        assert!(f.folder.join(PAGE_FILE).exists());
        assert!(!f.folder.join(STYLESHEET_FILE).exists());
    }

    #[test]
    fn render_is_byte_identical_for_identical_inputs() {
        let f = fixture(Some("css"));
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let backend = MockBackend::new();

        render_gallery(&backend, &request(&f, &date)).unwrap();
        let first = fs::read(f.folder.join(PAGE_FILE)).unwrap();
        render_gallery(&backend, &request(&f, &date)).unwrap();
        assert_eq!(fs::read(f.folder.join(PAGE_FILE)).unwrap(), first);
    }

    #[test]
    fn render_unreadable_photo_fails_before_writing() {
        let f = fixture(None);
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let backend = MockBackend::failing_on("b.jpg");

        let result = render_gallery(&backend, &request(&f, &date));
        assert!(matches!(result, Err(GenerateError::Image { .. })));
        assert!(!f.folder.join(PAGE_FILE).exists());
    }

    #[test]
    fn render_copies_stylesheet_before_reading_photos() {
        let f = fixture(Some("body { color: red }"));
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let backend = MockBackend::failing_on("a.jpg");

        assert!(render_gallery(&backend, &request(&f, &date)).is_err());
        assert_eq!(
            fs::read_to_string(f.folder.join(STYLESHEET_FILE)).unwrap(),
            "body { color: red }"
        );
        assert!(!f.folder.join(PAGE_FILE).exists());
    }

    #[test]
    fn render_unknown_template_fails() {
        let f = fixture(None);
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let req = RenderRequest {
            template: "missing",
            ..request(&f, &date)
        };
        assert!(matches!(
            render_gallery(&MockBackend::new(), &req),
            Err(GenerateError::TemplateNotFound { .. })
        ));
    }
}
