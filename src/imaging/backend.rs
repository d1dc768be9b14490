//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the pipeline needs:
//! identify (decode far enough to learn the pixel dimensions) and encode
//! (decode, resample to the target dimensions, re-encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording [`tests::MockBackend`].

use super::blob::ImageBlob;
use super::params::EncodeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    /// The blob could not be decoded (malformed or unsupported format).
    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),
    /// Invalid target dimensions or the encoder rejected the image.
    #[error("Encoding failed: {0}")]
    EncodingFailure(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Trait for image codec backends.
///
/// Implementations must be `Sync` so batches can be normalized with rayon.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, blob: &ImageBlob) -> Result<Dimensions, BackendError>;

    /// Decode `params.source`, resample it to `params.width` x `params.height`
    /// and encode it as `params.format`.
    fn encode(&self, params: &EncodeParams<'_>) -> Result<ImageBlob, BackendError>;
}
