//! Encoded image buffers passed between pipeline stages.
//!
//! An [`ImageBlob`] is immutable. The bytes live behind an `Arc`, so handing a
//! blob back unchanged from a stage is a cheap clone that still points at the
//! same buffer. [`ImageBlob::same_buffer`] is how callers (and tests) tell a
//! pass-through apart from a re-encode.

use image::ImageFormat;
use std::fmt;
use std::sync::Arc;

/// MIME type of an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MimeType {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    WebP,
    /// Anything else. Decoding will be attempted but is expected to fail.
    Other,
}

impl MimeType {
    /// The `image` crate format this type decodes as, if any.
    pub fn format(self) -> Option<ImageFormat> {
        match self {
            MimeType::Jpeg => Some(ImageFormat::Jpeg),
            MimeType::Png => Some(ImageFormat::Png),
            MimeType::Gif => Some(ImageFormat::Gif),
            MimeType::Bmp => Some(ImageFormat::Bmp),
            MimeType::Tiff => Some(ImageFormat::Tiff),
            MimeType::WebP => Some(ImageFormat::WebP),
            MimeType::Other => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.format()
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream")
    }

    /// Sniff the type from the leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Self {
        image::guess_format(bytes)
            .map(Self::from)
            .unwrap_or(MimeType::Other)
    }
}

impl From<ImageFormat> for MimeType {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => MimeType::Jpeg,
            ImageFormat::Png => MimeType::Png,
            ImageFormat::Gif => MimeType::Gif,
            ImageFormat::Bmp => MimeType::Bmp,
            ImageFormat::Tiff => MimeType::Tiff,
            ImageFormat::WebP => MimeType::WebP,
            _ => MimeType::Other,
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An encoded image: bytes plus the MIME type they claim to be.
#[derive(Debug, Clone)]
pub struct ImageBlob {
    bytes: Arc<[u8]>,
    mime: MimeType,
}

impl ImageBlob {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime: MimeType) -> Self {
        Self {
            bytes: bytes.into(),
            mime,
        }
    }

    /// Build a blob whose MIME type is sniffed from its content.
    pub fn sniffed(bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        let mime = MimeType::sniff(&bytes);
        Self { bytes, mime }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> MimeType {
        self.mime
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// True when both blobs share the same underlying buffer, i.e. one was
    /// passed through a stage without being re-encoded.
    pub fn same_buffer(a: &ImageBlob, b: &ImageBlob) -> bool {
        Arc::ptr_eq(&a.bytes, &b.bytes)
    }
}
