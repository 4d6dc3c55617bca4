//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `source` inside a `bounds` box, preserving aspect ratio.
///
/// Never upscales: a source already inside the box keeps its size.
/// Each side is at least 1 pixel.
///
/// ```text
/// (4000, 3000) in (1920, 1080) → (1440, 1080)
/// (3000, 1000) in (1920, 1080) → (1920, 640)
/// (800,  600)  in (1920, 1080) → (800, 600)
/// ```
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w == 0 || src_h == 0 || (src_w <= max_w && src_h <= max_h) {
        return source;
    }

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h);
    (w, h)
}

/// Height of a thumbnail scaled to `target_width`, preserving aspect ratio.
///
/// Thumbnails always take the target width, upscaling small sources.
pub fn scaled_height(source: (u32, u32), target_width: u32) -> u32 {
    let (src_w, src_h) = source;
    if src_w == 0 {
        return src_h.max(1);
    }
    ((src_h as f64 * target_width as f64 / src_w as f64).round() as u32).max(1)
}
