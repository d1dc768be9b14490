//! Parameter types for image operations.
//!
//! These structs describe *what* to encode, not *how*. They are the interface
//! between the high-level [`operations`](super::operations) module (which
//! decides the target dimensions) and the [`backend`](super::backend) (which
//! does the pixel work). Swapping the backend for a mock leaves the operation
//! logic untouched.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`EncodeParams`]: Source blob, target dimensions, output format and quality.

use super::blob::{ImageBlob, MimeType};

/// Quality setting for lossy image encoding (1-100).
///
/// `Quality::new(90)` is the JPEG quality 0.9 a browser canvas would use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Parameters for a decode → resize → encode operation.
#[derive(Debug, Clone)]
pub struct EncodeParams<'a> {
    pub source: &'a ImageBlob,
    pub width: u32,
    pub height: u32,
    pub format: MimeType,
    pub quality: Quality,
}
