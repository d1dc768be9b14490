//! Image normalization: pure Rust, built on the `image` crate.
//!
//! | Stage | Rule |
//! |---|---|
//! | **JPEG** | non-JPEG input is re-encoded as JPEG at the same size |
//! | **Min resolution** | below 200x200 → upscale, ceiling rounding |
//! | **Max resolution** | above 1024x1024 → downscale, floor rounding |
//! | **Max size** | above 1 MB → shrink by a decreasing ratio until it fits |
//! | **Thumbnail** | longer edge capped at 142px |
//!
//! The module is split into:
//! - **Blob**: [`ImageBlob`], the immutable encoded buffer passed between stages
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing an encode
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Stage functions combining calculations + backend

pub mod backend;
pub mod blob;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use blob::{ImageBlob, MimeType};
pub use operations::{
    Constraints, NormalizeError, Normalized, Stage, StageReport, convert_to_jpeg,
    create_thumbnail, get_dimensions, normalize, scale_down_if_too_large_resolution,
    scale_down_if_too_large_size, scale_up_if_too_small,
};
pub use params::{EncodeParams, Quality};
pub use rust_backend::RustBackend;
