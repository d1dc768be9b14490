//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only, no full decode) |
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image::load_from_memory` |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::blob::{ImageBlob, MimeType};
use super::params::EncodeParams;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Codec backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a blob into pixels.
fn load_image(blob: &ImageBlob) -> Result<DynamicImage, BackendError> {
    image::load_from_memory(blob.bytes()).map_err(|e| {
        BackendError::UnsupportedImageFormat(format!("failed to decode {}: {}", blob.mime(), e))
    })
}

/// Encode pixels into a new blob of the requested format.
fn save_image(
    img: &DynamicImage,
    format: MimeType,
    quality: u8,
) -> Result<ImageBlob, BackendError> {
    let mut buf = Vec::new();
    match format {
        MimeType::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
            rgb.write_with_encoder(encoder)
                .map_err(|e| BackendError::EncodingFailure(format!("JPEG encode failed: {}", e)))?;
        }
        MimeType::Png => {
            let encoder = image::codecs::png::PngEncoder::new(&mut buf);
            img.write_with_encoder(encoder)
                .map_err(|e| BackendError::EncodingFailure(format!("PNG encode failed: {}", e)))?;
        }
        other => {
            return Err(BackendError::EncodingFailure(format!(
                "Unsupported output format: {}",
                other
            )));
        }
    }
    Ok(ImageBlob::new(buf, format))
}

impl ImageBackend for RustBackend {
    fn identify(&self, blob: &ImageBlob) -> Result<Dimensions, BackendError> {
        let reader = ImageReader::new(Cursor::new(blob.bytes()))
            .with_guessed_format()
            .map_err(|e| BackendError::UnsupportedImageFormat(e.to_string()))?;
        let (width, height) = reader.into_dimensions().map_err(|e| {
            BackendError::UnsupportedImageFormat(format!("Failed to read dimensions: {}", e))
        })?;
        if width == 0 || height == 0 {
            return Err(BackendError::UnsupportedImageFormat(format!(
                "image has no pixels ({width}x{height})"
            )));
        }
        Ok(Dimensions { width, height })
    }

    fn encode(&self, params: &EncodeParams<'_>) -> Result<ImageBlob, BackendError> {
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::EncodingFailure(format!(
                "invalid target dimensions {}x{}",
                params.width, params.height
            )));
        }
        let img = load_image(params.source)?;
        let resized = if img.width() == params.width && img.height() == params.height {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        save_image(&resized, params.format, params.quality.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use crate::imaging::operations::{Constraints, scale_down_if_too_large_size};
    use crate::test_helpers::{gradient_jpeg, gradient_png, noise_jpeg};

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = super::supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let backend = RustBackend::new();
        let dims = backend.identify(&gradient_jpeg(200, 150)).unwrap();
        assert_eq!(dims, Dimensions::new(200, 150));
    }

    #[test]
    fn identify_synthetic_png() {
        let backend = RustBackend::new();
        let dims = backend.identify(&gradient_png(64, 48)).unwrap();
        assert_eq!(dims, Dimensions::new(64, 48));
    }

    #[test]
    fn identify_garbage_is_unsupported() {
        let backend = RustBackend::new();
        let blob = ImageBlob::new(b"not an image at all".to_vec(), MimeType::Png);
        assert!(matches!(
            backend.identify(&blob),
            Err(BackendError::UnsupportedImageFormat(_))
        ));
    }

    #[test]
    fn encode_png_to_jpeg_resized() {
        let backend = RustBackend::new();
        let source = gradient_png(400, 300);

        let out = backend
            .encode(&EncodeParams {
                source: &source,
                width: 200,
                height: 150,
                format: MimeType::Jpeg,
                quality: Quality::new(85),
            })
            .unwrap();

        assert_eq!(out.mime(), MimeType::Jpeg);
        assert_eq!(MimeType::sniff(out.bytes()), MimeType::Jpeg);
        assert_eq!(backend.identify(&out).unwrap(), Dimensions::new(200, 150));
    }

    #[test]
    fn encode_lower_quality_is_smaller() {
        let backend = RustBackend::new();
        let source = gradient_jpeg(320, 240);
        let encode = |q| {
            backend
                .encode(&EncodeParams {
                    source: &source,
                    width: 320,
                    height: 240,
                    format: MimeType::Jpeg,
                    quality: Quality::new(q),
                })
                .unwrap()
                .byte_size()
        };
        assert!(encode(20) < encode(95));
    }

    #[test]
    fn encode_zero_dimensions_fails() {
        let backend = RustBackend::new();
        let source = gradient_jpeg(10, 10);
        let result = backend.encode(&EncodeParams {
            source: &source,
            width: 0,
            height: 10,
            format: MimeType::Jpeg,
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::EncodingFailure(_))));
    }

    #[test]
    fn encode_unsupported_output_format_fails() {
        let backend = RustBackend::new();
        let source = gradient_jpeg(10, 10);
        let result = backend.encode(&EncodeParams {
            source: &source,
            width: 10,
            height: 10,
            format: MimeType::WebP,
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::EncodingFailure(_))));
    }

    #[test]
    fn noisy_jpeg_shrinks_under_budget() {
        let backend = RustBackend::new();
        let source = noise_jpeg(600, 400, 95);
        let constraints = Constraints {
            max_byte_size: source.byte_size() / 4,
            ..Constraints::default()
        };

        let out = scale_down_if_too_large_size(&backend, &source, &constraints).unwrap();

        assert!(out.byte_size() <= constraints.max_byte_size);
        let dims = backend.identify(&out).unwrap();
        assert!(dims.width < 600 && dims.height < 400);
    }
}
