//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Each `*_dimensions` function returns `None` when the image already
//! satisfies its constraint, which is how the operations layer decides to
//! skip a re-encode.

/// Integer `ceil(a * b / c)` without going through floating point.
fn mul_div_ceil(a: u32, b: u32, c: u32) -> u32 {
    let (a, b, c) = (a as u64, b as u64, c as u64);
    (a * b).div_ceil(c).min(u32::MAX as u64) as u32
}

/// Integer `floor(a * b / c)`, never below 1 so a degenerate aspect ratio
/// still yields an encodable image.
fn mul_div_floor(a: u32, b: u32, c: u32) -> u32 {
    let (a, b, c) = (a as u64, b as u64, c as u64);
    ((a * b / c).max(1)).min(u32::MAX as u64) as u32
}

/// Calculate the upscaled dimensions for an image below the resolution floor.
///
/// - Only the width is too small: width becomes `min_w`, height follows with
///   ceiling rounding.
/// - Only the height is too small: the mirror case.
/// - Both are too small: the dimension with the larger deficit drives the
///   scale. Ties go to the height (`>` not `>=`).
///
/// An empty image has no aspect ratio to keep and yields `None`.
///
/// # Examples
/// ```
/// # use searchprep::imaging::calculations::calculate_scale_up_dimensions;
/// // 50x50 → 200x200
/// assert_eq!(calculate_scale_up_dimensions((50, 50), (200, 200)), Some((200, 200)));
///
/// // Already large enough
/// assert_eq!(calculate_scale_up_dimensions((300, 200), (200, 200)), None);
/// ```
pub fn calculate_scale_up_dimensions(source: (u32, u32), min: (u32, u32)) -> Option<(u32, u32)> {
    let (w, h) = source;
    let (min_w, min_h) = min;

    if (w >= min_w && h >= min_h) || w == 0 || h == 0 {
        return None;
    }

    let by_width = || (min_w, mul_div_ceil(h, min_w, w));
    let by_height = || (mul_div_ceil(w, min_h, h), min_h);

    let target = if w < min_w && h >= min_h {
        by_width()
    } else if w >= min_w && h < min_h {
        by_height()
    } else if min_w - w > min_h - h {
        by_width()
    } else {
        by_height()
    };
    Some(target)
}

/// Calculate dimensions that fit inside a `max` bounding box.
///
/// The binding dimension is the longer one (`width > height` picks the width,
/// otherwise the height); the other dimension follows with floor rounding.
/// When the ceilings differ and the first fit still overflows the other
/// ceiling, the image is fitted again against that ceiling.
///
/// Used for both the resolution ceiling and thumbnails.
///
/// # Examples
/// ```
/// # use searchprep::imaging::calculations::calculate_fit_dimensions;
/// assert_eq!(calculate_fit_dimensions((4000, 3000), (1024, 1024)), Some((1024, 768)));
/// assert_eq!(calculate_fit_dimensions((3000, 4000), (1024, 1024)), Some((768, 1024)));
/// assert_eq!(calculate_fit_dimensions((800, 600), (1024, 1024)), None);
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), max: (u32, u32)) -> Option<(u32, u32)> {
    let (w, h) = source;
    let (max_w, max_h) = max;

    if (w <= max_w && h <= max_h) || w == 0 || h == 0 {
        return None;
    }

    let fit_width = |w: u32, h: u32| (max_w, mul_div_floor(h, max_w, w));
    let fit_height = |w: u32, h: u32| (mul_div_floor(w, max_h, h), max_h);

    let (tw, th) = if w > h { fit_width(w, h) } else { fit_height(w, h) };

    let target = if th > max_h {
        fit_height(w, h)
    } else if tw > max_w {
        fit_width(w, h)
    } else {
        (tw, th)
    };
    Some(target)
}

/// First scaling ratio tried when an image exceeds the byte budget.
///
/// Encoded size grows roughly with pixel count, i.e. with the square of the
/// linear scale, hence the square root.
pub fn initial_size_ratio(byte_size: u64, max_byte_size: u64) -> f64 {
    (max_byte_size as f64 / byte_size as f64).sqrt()
}

/// Tolerance for the 0.1 threshold. Repeated subtraction of 0.1 drifts
/// (0.5 − 4 × 0.1 = 0.10000000000000003), which would otherwise take one more
/// 0.1 step down to a ratio of ~3e-17.
const RATIO_STEP_EPSILON: f64 = 1e-9;

/// Next ratio after an attempt came out over budget: step down by 0.1 while
/// the ratio is above 0.1, halve it afterwards.
pub fn next_size_ratio(ratio: f64) -> f64 {
    if ratio > 0.1 + RATIO_STEP_EPSILON {
        ratio - 0.1
    } else {
        ratio / 2.0
    }
}

/// The sequence of ratios tried by the byte-size reduction.
///
/// Strictly decreasing and always positive.
///
/// ```
/// # use searchprep::imaging::calculations::SizeRatioSteps;
/// let ratios: Vec<f64> = SizeRatioSteps::new(0.35).take(4).collect();
/// assert!((ratios[0] - 0.35).abs() < 1e-9);
/// assert!((ratios[1] - 0.25).abs() < 1e-9);
/// assert!((ratios[3] - 0.05).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct SizeRatioSteps {
    next: f64,
}

impl SizeRatioSteps {
    pub fn new(initial: f64) -> Self {
        Self { next: initial }
    }
}

impl Iterator for SizeRatioSteps {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let current = self.next;
        self.next = next_size_ratio(current);
        Some(current)
    }
}

/// Scale both dimensions by `ratio` with rounding, never below 1 pixel.
pub fn calculate_ratio_dimensions(source: (u32, u32), ratio: f64) -> (u32, u32) {
    let scale = |v: u32| ((v as f64 * ratio).round() as u32).max(1);
    (scale(source.0), scale(source.1))
}
