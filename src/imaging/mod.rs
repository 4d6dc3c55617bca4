//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **EXIF dates** | `kamadak-exif` |
//! | **Optimize** | fit inside 1920×1080, Lanczos3, JPEG q85 @ 96 dpi, in place |
//! | **Thumbnail** | 300px wide, proportional height, JPEG q80 |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub(crate) mod exif_dates;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, ImageMetadata};
pub use operations::{
    OptimizeConfig, ThumbnailConfig, create_thumbnail, get_dimensions, optimize_photo,
};
pub use params::{OptimizeParams, Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
