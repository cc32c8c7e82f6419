//! Image processing — decode anything common, publish JPEG or PNG.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode + EXIF orientation** | `image::ImageReader` + `apply_orientation` |
//! | **Thumbnail** | cover-crop via `resize_exact` + `crop_imm` |
//! | **Inline** | width cap, Lanczos3 |
//! | **Flatten** | `imageops::overlay` onto white |
//!
//! The module is split into:
//! - **Fit**: Pure functions for dimension math (unit testable)
//! - **Optimize**: The pipeline itself, from source bytes to a named
//!   file in the assets directory

mod fit;
mod optimize;

pub use fit::{cover_dimensions, crop_origin, width_capped};
pub use optimize::{
    FitMode, ImageJob, ImageOptimizer, ImageSource, ImagingError, OptimizeOptions,
    OptimizeOutcome, OptimizedImage, OutputFormat, Quality, is_source_image,
};
