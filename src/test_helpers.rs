//! Shared test fixtures: synthetic encoded images built with the `image` crate.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let png = gradient_png(50, 50);
//! let jpeg = noise_jpeg(800, 600, 95);
//! ```

use crate::imaging::{ImageBlob, MimeType};
use image::{ImageEncoder, RgbImage};

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Deterministic high-entropy pixels, so JPEG can't compress them much.
fn noise(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 0x9E37_79B9;
    RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xFF) as u8
        };
        image::Rgb([next(), next(), next()])
    })
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> ImageBlob {
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    ImageBlob::new(buf, MimeType::Jpeg)
}

/// A smooth gradient PNG.
pub fn gradient_png(width: u32, height: u32) -> ImageBlob {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            img.as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    ImageBlob::new(buf, MimeType::Png)
}

/// A smooth gradient JPEG at quality 90.
pub fn gradient_jpeg(width: u32, height: u32) -> ImageBlob {
    encode_jpeg(&gradient(width, height), 90)
}

/// A noisy JPEG, large on disk for its resolution.
pub fn noise_jpeg(width: u32, height: u32, quality: u8) -> ImageBlob {
    encode_jpeg(&noise(width, height), quality)
}
