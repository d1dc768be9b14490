//! High-level image operations.
//!
//! These functions combine calculations with backend execution. Each stage
//! takes a blob and the [`Constraints`], and either hands the same blob back
//! (already compliant, no re-encode) or returns a freshly encoded JPEG.
//! [`normalize`] chains the four normalization stages in their fixed order.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::blob::{ImageBlob, MimeType};
use super::calculations::{
    SizeRatioSteps, calculate_fit_dimensions, calculate_ratio_dimensions,
    calculate_scale_up_dimensions, initial_size_ratio,
};
use super::params::{EncodeParams, Quality};
use log::{debug, info, warn};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(
        "Could not bring {original_size} bytes under {max_byte_size} bytes after {attempts} attempts (last attempt: {last_size} bytes)"
    )]
    ConvergenceExhausted {
        attempts: u32,
        original_size: u64,
        last_size: u64,
        max_byte_size: u64,
    },
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, NormalizeError>;

/// Format, resolution and size envelope a normalized image must fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub max_byte_size: u64,
    pub thumbnail_max_size: u32,
    pub quality: Quality,
    /// Upper bound on re-encodes in [`scale_down_if_too_large_size`].
    pub max_size_attempts: u32,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            min_width: 200,
            min_height: 200,
            max_width: 1024,
            max_height: 1024,
            max_byte_size: 1_000_000,
            thumbnail_max_size: 142,
            quality: Quality::default(),
            max_size_attempts: 64,
        }
    }
}

/// Output format of every re-encode.
pub const TARGET_FORMAT: MimeType = MimeType::Jpeg;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, blob: &ImageBlob) -> Result<Dimensions> {
    Ok(backend.identify(blob)?)
}

fn reencode(
    backend: &impl ImageBackend,
    blob: &ImageBlob,
    (width, height): (u32, u32),
    constraints: &Constraints,
) -> Result<ImageBlob> {
    let encoded = backend.encode(&EncodeParams {
        source: blob,
        width,
        height,
        format: TARGET_FORMAT,
        quality: constraints.quality,
    })?;
    Ok(encoded)
}

/// Re-encode a non-JPEG image as JPEG at its current dimensions.
///
/// A JPEG input is returned as-is without being decoded.
pub fn convert_to_jpeg(
    backend: &impl ImageBackend,
    blob: &ImageBlob,
    constraints: &Constraints,
) -> Result<ImageBlob> {
    if blob.mime() == TARGET_FORMAT {
        debug!("convert_to_jpeg: already {TARGET_FORMAT}");
        return Ok(blob.clone());
    }
    let dims = backend.identify(blob)?;
    let out = reencode(backend, blob, (dims.width, dims.height), constraints)?;
    info!(
        "convert_to_jpeg: {} {} ({} bytes) → {} ({} bytes)",
        blob.mime(),
        dims,
        blob.byte_size(),
        TARGET_FORMAT,
        out.byte_size()
    );
    Ok(out)
}

/// Upscale an image below the resolution floor, preserving its aspect ratio.
pub fn scale_up_if_too_small(
    backend: &impl ImageBackend,
    blob: &ImageBlob,
    constraints: &Constraints,
) -> Result<ImageBlob> {
    let dims = backend.identify(blob)?;
    let Some(target) = calculate_scale_up_dimensions(
        (dims.width, dims.height),
        (constraints.min_width, constraints.min_height),
    ) else {
        debug!("scale_up_if_too_small: {dims} meets the floor");
        return Ok(blob.clone());
    };
    let out = reencode(backend, blob, target, constraints)?;
    info!(
        "scale_up_if_too_small: {dims} → {}x{}",
        target.0, target.1
    );
    Ok(out)
}

/// Downscale an image above the resolution ceiling, preserving its aspect ratio.
pub fn scale_down_if_too_large_resolution(
    backend: &impl ImageBackend,
    blob: &ImageBlob,
    constraints: &Constraints,
) -> Result<ImageBlob> {
    let dims = backend.identify(blob)?;
    let Some(target) = calculate_fit_dimensions(
        (dims.width, dims.height),
        (constraints.max_width, constraints.max_height),
    ) else {
        debug!("scale_down_if_too_large_resolution: {dims} within the ceiling");
        return Ok(blob.clone());
    };
    let out = reencode(backend, blob, target, constraints)?;
    info!(
        "scale_down_if_too_large_resolution: {dims} → {}x{}",
        target.0, target.1
    );
    Ok(out)
}

/// Shrink an image until its encoded size fits the byte budget.
///
/// Every attempt resamples the stage input (not the previous attempt) at the
/// next ratio from [`SizeRatioSteps`]. Gives up with
/// [`NormalizeError::ConvergenceExhausted`] after
/// [`Constraints::max_size_attempts`] encodes.
pub fn scale_down_if_too_large_size(
    backend: &impl ImageBackend,
    blob: &ImageBlob,
    constraints: &Constraints,
) -> Result<ImageBlob> {
    let original_size = blob.byte_size();
    if original_size <= constraints.max_byte_size {
        debug!(
            "scale_down_if_too_large_size: {original_size} bytes within {}",
            constraints.max_byte_size
        );
        return Ok(blob.clone());
    }

    let dims = backend.identify(blob)?;
    let initial = initial_size_ratio(original_size, constraints.max_byte_size);
    let mut last_size = original_size;
    let mut attempts = 0;

    for ratio in SizeRatioSteps::new(initial).take(constraints.max_size_attempts as usize) {
        attempts += 1;
        let target = calculate_ratio_dimensions((dims.width, dims.height), ratio);
        let out = reencode(backend, blob, target, constraints)?;
        debug!(
            "scale_down_if_too_large_size: attempt {attempts} ratio {ratio:.4} → {}x{} ({} bytes)",
            target.0,
            target.1,
            out.byte_size()
        );
        if out.byte_size() <= constraints.max_byte_size {
            info!(
                "scale_down_if_too_large_size: {original_size} → {} bytes in {attempts} attempt(s)",
                out.byte_size()
            );
            return Ok(out);
        }
        last_size = out.byte_size();
    }

    warn!(
        "scale_down_if_too_large_size: gave up after {attempts} attempts ({last_size} bytes)"
    );
    Err(NormalizeError::ConvergenceExhausted {
        attempts,
        original_size,
        last_size,
        max_byte_size: constraints.max_byte_size,
    })
}

/// Downscale an image so neither side exceeds `thumbnail_max_size`.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    blob: &ImageBlob,
    constraints: &Constraints,
) -> Result<ImageBlob> {
    let dims = backend.identify(blob)?;
    let max = constraints.thumbnail_max_size;
    let Some(target) = calculate_fit_dimensions((dims.width, dims.height), (max, max)) else {
        return Ok(blob.clone());
    };
    let out = reencode(backend, blob, target, constraints)?;
    debug!("create_thumbnail: {dims} → {}x{}", target.0, target.1);
    Ok(out)
}

/// A normalization stage, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ConvertToJpeg,
    ScaleUp,
    ScaleDownResolution,
    ScaleDownSize,
}

impl Stage {
    pub const PIPELINE: [Stage; 4] = [
        Stage::ConvertToJpeg,
        Stage::ScaleUp,
        Stage::ScaleDownResolution,
        Stage::ScaleDownSize,
    ];

    fn run(
        self,
        backend: &impl ImageBackend,
        blob: &ImageBlob,
        constraints: &Constraints,
    ) -> Result<ImageBlob> {
        match self {
            Stage::ConvertToJpeg => convert_to_jpeg(backend, blob, constraints),
            Stage::ScaleUp => scale_up_if_too_small(backend, blob, constraints),
            Stage::ScaleDownResolution => {
                scale_down_if_too_large_resolution(backend, blob, constraints)
            }
            Stage::ScaleDownSize => scale_down_if_too_large_size(backend, blob, constraints),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::ConvertToJpeg => "jpeg",
            Stage::ScaleUp => "min resolution",
            Stage::ScaleDownResolution => "max resolution",
            Stage::ScaleDownSize => "max size",
        })
    }
}

/// What one stage did to the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub reencoded: bool,
    pub byte_size: u64,
}

/// Output of [`normalize`].
#[derive(Debug, Clone)]
pub struct Normalized {
    pub blob: ImageBlob,
    pub dimensions: Dimensions,
    pub stages: Vec<StageReport>,
}

impl Normalized {
    /// True when no stage had to re-encode.
    pub fn untouched(&self) -> bool {
        self.stages.iter().all(|s| !s.reencoded)
    }
}

/// Run the full normalization sequence: JPEG conversion, resolution floor,
/// resolution ceiling, then byte budget.
///
/// The byte budget is checked last since conversion and upscaling can both
/// grow the encoded size.
pub fn normalize(
    backend: &impl ImageBackend,
    blob: &ImageBlob,
    constraints: &Constraints,
) -> Result<Normalized> {
    let mut current = blob.clone();
    let mut stages = Vec::with_capacity(Stage::PIPELINE.len());

    for stage in Stage::PIPELINE {
        let next = stage.run(backend, &current, constraints)?;
        stages.push(StageReport {
            stage,
            reencoded: !ImageBlob::same_buffer(&current, &next),
            byte_size: next.byte_size(),
        });
        current = next;
    }

    let dimensions = backend.identify(&current)?;
    Ok(Normalized {
        blob: current,
        dimensions,
        stages,
    })
}
