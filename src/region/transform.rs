//! Coordinate spaces and the transform between them.
//!
//! A [`Region`] lives in original-image pixels. A [`DisplayRect`] is the same
//! rectangle as rendered on screen. [`ScalingTransform`] converts between the
//! two with independent horizontal and vertical factors; nothing forces them
//! to be equal.

use serde::{Deserialize, Serialize};

/// Width and height of an image, in either coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl From<crate::imaging::Dimensions> for Size {
    fn from(dims: crate::imaging::Dimensions) -> Self {
        Self::new(dims.width as f64, dims.height as f64)
    }
}

/// Region of interest in original-image pixel coordinates.
///
/// Serializes as `{"x":..,"y":..,"width":..,"height":..}`, the shape the
/// search service accepts and returns.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True for the all-zero region used before any search has scoped one.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Clamp into `bounds`: all values non-negative, `x + width <= bounds.width`
    /// and `y + height <= bounds.height`.
    pub fn clamped_to(self, bounds: Size) -> Self {
        let x = self.x.clamp(0.0, bounds.width.max(0.0));
        let y = self.y.clamp(0.0, bounds.height.max(0.0));
        Self {
            x,
            y,
            width: self.width.clamp(0.0, (bounds.width - x).max(0.0)),
            height: self.height.clamp(0.0, (bounds.height - y).max(0.0)),
        }
    }
}

/// A rectangle in display coordinates (relative to the rendered image's
/// top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Horizontal padding of the container the image is centered in.
pub const CONTAINER_PADDING: f64 = 30.0;

/// Relation between display and original coordinates for one rendering of an
/// image. Recompute whenever the rendered size changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingTransform {
    pub h_scale: f64,
    pub v_scale: f64,
    /// Left offset of the rendered image inside its container.
    pub origin_x: f64,
}

impl Default for ScalingTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn ratio(displayed: f64, original: f64) -> f64 {
    if original > 0.0 { displayed / original } else { 1.0 }
}

fn unscale(value: f64, scale: f64) -> f64 {
    if scale > 0.0 { value / scale } else { 0.0 }
}

impl ScalingTransform {
    pub const IDENTITY: ScalingTransform = ScalingTransform {
        h_scale: 1.0,
        v_scale: 1.0,
        origin_x: 0.0,
    };

    /// `h_scale = displayed.width / original.width`, same for height.
    ///
    /// A zero original dimension yields a factor of 1 rather than infinity.
    pub fn compute(displayed: Size, original: Size) -> Self {
        Self {
            h_scale: ratio(displayed.width, original.width),
            v_scale: ratio(displayed.height, original.height),
            origin_x: 0.0,
        }
    }

    /// Set `origin_x` for an image horizontally centered in a container of
    /// `container_width` with [`CONTAINER_PADDING`].
    pub fn centered_in(self, container_width: f64, displayed_width: f64) -> Self {
        Self {
            origin_x: (container_width - displayed_width + CONTAINER_PADDING) / 2.0,
            ..self
        }
    }

    pub fn to_display_rect(&self, region: &Region) -> DisplayRect {
        DisplayRect {
            x: region.x * self.h_scale,
            y: region.y * self.v_scale,
            width: region.width * self.h_scale,
            height: region.height * self.v_scale,
        }
    }

    pub fn to_original(&self, rect: &DisplayRect) -> Region {
        Region {
            x: unscale(rect.x, self.h_scale),
            y: unscale(rect.y, self.v_scale),
            width: unscale(rect.width, self.h_scale),
            height: unscale(rect.height, self.v_scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn compute_uses_independent_factors() {
        let t = ScalingTransform::compute(Size::new(512.0, 600.0), Size::new(1024.0, 750.0));
        assert_close(t.h_scale, 0.5);
        assert_close(t.v_scale, 0.8);
        assert_close(t.origin_x, 0.0);
    }

    #[test]
    fn compute_zero_original_is_identity() {
        let t = ScalingTransform::compute(Size::new(100.0, 100.0), Size::new(0.0, 0.0));
        assert_eq!(t, ScalingTransform::IDENTITY);
    }

    #[test]
    fn anisotropic_display_rect_to_original() {
        let t = ScalingTransform {
            h_scale: 0.5,
            v_scale: 0.8,
            origin_x: 0.0,
        };
        let region = t.to_original(&DisplayRect::new(100.0, 100.0, 50.0, 50.0));
        assert_close(region.x, 200.0);
        assert_close(region.y, 125.0);
        assert_close(region.width, 100.0);
        assert_close(region.height, 62.5);
    }

    #[test]
    fn display_round_trip_recovers_region() {
        let t = ScalingTransform::compute(Size::new(333.0, 517.0), Size::new(1024.0, 768.0));
        let region = Region::new(17.25, 301.0, 640.5, 212.125);

        let back = t.to_original(&t.to_display_rect(&region));
        let again = t.to_display_rect(&back);
        let display = t.to_display_rect(&region);

        assert_close(back.x, region.x);
        assert_close(back.y, region.y);
        assert_close(back.width, region.width);
        assert_close(back.height, region.height);
        assert_close(again.right(), display.right());
        assert_close(again.bottom(), display.bottom());
    }

    #[test]
    fn centered_origin_accounts_for_padding() {
        let t = ScalingTransform::IDENTITY.centered_in(1000.0, 600.0);
        assert_close(t.origin_x, 215.0);
    }

    #[test]
    fn clamp_keeps_region_inside_bounds() {
        let bounds = Size::new(100.0, 50.0);
        let clamped = Region::new(-5.0, 40.0, 200.0, 30.0).clamped_to(bounds);
        assert_eq!(clamped, Region::new(0.0, 40.0, 100.0, 10.0));

        let negative = Region::new(10.0, 10.0, -3.0, -1.0).clamped_to(bounds);
        assert_eq!(negative, Region::new(10.0, 10.0, 0.0, 0.0));
    }

    #[test]
    fn default_region_is_empty() {
        assert!(Region::default().is_empty());
        assert!(!Region::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn region_json_shape() {
        let region = Region::new(1.0, 2.0, 3.0, 4.5);
        let json = serde_json::to_string(&region).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0,"width":3.0,"height":4.5}"#);

        let parsed: Region = serde_json::from_str(r#"{"x":0,"y":0,"width":10,"height":20}"#).unwrap();
        assert_eq!(parsed, Region::new(0.0, 0.0, 10.0, 20.0));
    }
}
