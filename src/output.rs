//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Normalize
//!
//! ```text
//! 001 beach.png
//!     → 1024x768, 612.0 KB, re-encoded
//! 002 notes.txt
//!     failed: Unsupported image format: ...
//!
//! Normalized 1 of 2 images
//! ```
//!
//! ## Inspect
//!
//! ```text
//! beach.png
//!     Format: image/png
//!     Dimensions: 4000x3000
//!     Size: 2.4 MB
//!     jpeg: needs conversion
//!     min resolution: ok
//!     max resolution: exceeds 1024x1024, would downscale to 1024x768
//!     max size: exceeds 1.0 MB
//! ```

use crate::batch::BatchEvent;
use crate::imaging::calculations::{calculate_fit_dimensions, calculate_scale_up_dimensions};
use crate::imaging::operations::TARGET_FORMAT;
use crate::imaging::{Constraints, Dimensions, MimeType, Stage};
use crate::region::{DisplayRect, Region};

/// Format a 0-based batch index as a 1-based, 3-digit zero-padded label.
fn format_index(index: usize) -> String {
    format!("{:03}", index + 1)
}

/// Human-readable byte size.
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1000.0;
    const MB: f64 = KB * 1000.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

// ============================================================================
// normalize
// ============================================================================

/// Format a single batch progress event as display lines.
///
/// `Started` events produce no output; the lines are printed once the
/// image finishes so parallel workers do not interleave.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { .. } => Vec::new(),
        BatchEvent::Finished {
            index,
            name,
            width,
            height,
            byte_size,
            reencoded,
        } => {
            let status = if *reencoded { "re-encoded" } else { "unchanged" };
            vec![
                format!("{} {}", format_index(*index), name),
                format!(
                    "    → {}x{}, {}, {}",
                    width,
                    height,
                    format_bytes(*byte_size),
                    status
                ),
            ]
        }
        BatchEvent::Failed { index, name, error } => vec![
            format!("{} {}", format_index(*index), name),
            format!("    failed: {error}"),
        ],
    }
}

pub fn format_batch_summary(succeeded: usize, total: usize) -> String {
    format!("Normalized {succeeded} of {total} images")
}

pub fn print_batch_event(event: &BatchEvent) {
    for line in format_batch_event(event) {
        println!("{line}");
    }
}

// ============================================================================
// inspect
// ============================================================================

/// Describe an image and whether each pipeline stage would change it.
pub fn format_inspect(
    name: &str,
    mime: MimeType,
    dimensions: Dimensions,
    byte_size: u64,
    constraints: &Constraints,
) -> Vec<String> {
    let source = (dimensions.width, dimensions.height);
    let mut lines = vec![
        name.to_string(),
        format!("    Format: {mime}"),
        format!("    Dimensions: {dimensions}"),
        format!("    Size: {}", format_bytes(byte_size)),
    ];

    for stage in Stage::PIPELINE {
        let verdict = match stage {
            Stage::ConvertToJpeg if mime != TARGET_FORMAT => "needs conversion".to_string(),
            Stage::ScaleUp => {
                match calculate_scale_up_dimensions(
                    source,
                    (constraints.min_width, constraints.min_height),
                ) {
                    Some((w, h)) => format!(
                        "below {}x{}, would upscale to {w}x{h}",
                        constraints.min_width, constraints.min_height
                    ),
                    None => "ok".to_string(),
                }
            }
            Stage::ScaleDownResolution => {
                match calculate_fit_dimensions(
                    source,
                    (constraints.max_width, constraints.max_height),
                ) {
                    Some((w, h)) => format!(
                        "exceeds {}x{}, would downscale to {w}x{h}",
                        constraints.max_width, constraints.max_height
                    ),
                    None => "ok".to_string(),
                }
            }
            Stage::ScaleDownSize if byte_size > constraints.max_byte_size => {
                format!("exceeds {}", format_bytes(constraints.max_byte_size))
            }
            _ => "ok".to_string(),
        };
        lines.push(format!("    {stage}: {verdict}"));
    }
    lines
}

pub fn print_inspect(
    name: &str,
    mime: MimeType,
    dimensions: Dimensions,
    byte_size: u64,
    constraints: &Constraints,
) {
    for line in format_inspect(name, mime, dimensions, byte_size, constraints) {
        println!("{line}");
    }
}

// ============================================================================
// region
// ============================================================================

fn format_rect(x: f64, y: f64, width: f64, height: f64) -> String {
    format!("x={x} y={y} width={width} height={height}")
}

/// Format a region alongside its on-screen rectangle.
pub fn format_region(region: &Region, display: &DisplayRect) -> Vec<String> {
    vec![
        format!(
            "Original: {}",
            format_rect(region.x, region.y, region.width, region.height)
        ),
        format!(
            "Display:  {}",
            format_rect(display.x, display.y, display.width, display.height)
        ),
    ]
}

pub fn print_region(region: &Region, display: &DisplayRect) {
    for line in format_region(region, display) {
        println!("{line}");
    }
}
