//! Filename and folder-name hygiene.
//!
//! Two pure functions live here, both used before anything touches the disk:
//!
//! - [`normalize_filename`] maps an arbitrary photo filename to a canonical
//!   form that is safe in URLs and on every filesystem. Scan renames photos to
//!   this form in place, so the function must be idempotent: a second scan of
//!   an already-normalized gallery renames nothing.
//! - [`folder_slug`] derives the gallery folder name from its title at
//!   creation time.
//!
//! ## Filename rules
//!
//! ```text
//! "Fotó Día 1.JPG"   → "foto_dia_1.jpg"
//! "IMG 0001 (2).jpeg" → "img_0001_2.jpeg"
//! "a.b.PNG"          → "ab.png"
//! "README"           → "readme"        (no extension: whole name is the stem)
//! "日本.jpg"          → "photo.jpg"     (stem normalizes to nothing)
//! ```
//!
//! The extension (everything after the last `.`) is only lower-cased. The stem
//! is lower-cased, decomposed (NFD) with combining marks dropped, whitespace
//! runs become a single `_`, and everything outside `[a-z0-9_]` is deleted.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Stem used when nothing of the original stem survives normalization.
pub const FALLBACK_STEM: &str = "photo";

/// Normalize a photo filename. Pure, deterministic and idempotent.
pub fn normalize_filename(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{}.{}", normalize_stem(stem), ext.to_lowercase()),
        None => normalize_stem(filename),
    }
}

fn normalize_stem(stem: &str) -> String {
    let folded: String = strip_diacritics(&stem.to_lowercase());

    let mut out = String::with_capacity(folded.len());
    let mut in_space = false;
    for c in folded.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            out.push(c);
        }
    }

    if out.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        out
    }
}

/// Canonical decomposition with combining marks removed (`é` → `e`).
fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Derive the folder slug for a gallery title.
///
/// Lower-case ASCII letters and digits are kept, diacritics are folded to
/// their base letter, whitespace and dashes become a single `-`, and every
/// other character is dropped. Leading and trailing dashes are stripped.
/// Returns an empty string when nothing usable remains; callers treat that
/// as a missing title.
///
/// ```text
/// "My Trip"          → "my-trip"
/// "Café de Flore!"   → "cafe-de-flore"
/// "  Día -- 2  "     → "dia-2"
/// ```
pub fn folder_slug(title: &str) -> String {
    let folded = strip_diacritics(&title.to_lowercase());

    let mut slug = String::with_capacity(folded.len());
    let mut pending_dash = false;
    for c in folded.chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = !slug.is_empty();
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.push(c);
        }
    }
    slug
}
