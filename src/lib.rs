//! # searchprep
//!
//! Prepares images for a visual-search backend and keeps track of the region
//! of interest a search is scoped to.
//!
//! # Normalization Pipeline
//!
//! Every image is brought into one envelope before submission. Stages run in
//! a fixed order, each consuming the previous stage's output:
//!
//! ```text
//! 1. jpeg            any format  →  JPEG, same dimensions
//! 2. min resolution  < 200x200   →  upscaled to the floor
//! 3. max resolution  > 1024x1024 →  downscaled to the ceiling
//! 4. max size        > 1 MB      →  shrunk by a decreasing ratio until it fits
//! ```
//!
//! A stage with nothing to do hands its input through untouched, so an image
//! that is already compliant is never re-encoded.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Codec backend, dimension math and the normalization stages |
//! | [`batch`] | Parallel normalization of many images with progress events |
//! | [`region`] | Region of interest: coordinate transform, drag editing, overlay geometry |
//! | [`session`] | Run supersession: results of a replaced run are discarded |
//! | [`config`] | `searchprep.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Synchronous Stages
//!
//! Every stage is a plain blocking function taking `&impl ImageBackend`.
//! Decoding and encoding are CPU-bound, so callers run them on worker
//! threads ([`batch`] uses rayon) rather than on an async executor.
//!
//! ## Anisotropic Display Scaling
//!
//! The rendered image may be stretched differently along each axis, so the
//! region transform keeps separate horizontal and vertical factors.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;
pub mod region;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
