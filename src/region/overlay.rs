//! Overlay geometry drawn around the region of interest.
//!
//! Everything outside the region is dimmed by four blocks, and the two drag
//! handles are squares centered on the region's top-left and bottom-right
//! corners. Positions are relative to the image container, so they include
//! the transform's `origin_x`.

use super::transform::{DisplayRect, ScalingTransform, Size};

/// An absolutely positioned box inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Block {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// The four dimming blocks around the region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlayBlocks {
    /// Full width, from the image top to the region top.
    pub top: Block,
    /// Full width, from the region bottom to the image bottom.
    pub bottom: Block,
    /// Region height, from the image left edge to the region.
    pub left: Block,
    /// Region height, from the region to the image right edge.
    pub right: Block,
}

/// Boxes for the two drag handles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandleBoxes {
    pub top_left: Block,
    pub bottom_right: Block,
}

pub fn overlay_blocks(
    transform: &ScalingTransform,
    displayed: Size,
    rect: &DisplayRect,
) -> OverlayBlocks {
    let origin = transform.origin_x;
    let nonneg = |v: f64| v.max(0.0);

    OverlayBlocks {
        top: Block {
            left: origin,
            top: 0.0,
            width: displayed.width,
            height: nonneg(rect.y),
        },
        bottom: Block {
            left: origin,
            top: rect.bottom(),
            width: displayed.width,
            height: nonneg(displayed.height - rect.bottom()),
        },
        left: Block {
            left: origin,
            top: rect.y,
            width: nonneg(rect.x),
            height: rect.height,
        },
        right: Block {
            left: origin + rect.right(),
            top: rect.y,
            width: nonneg(displayed.width - rect.right()),
            height: rect.height,
        },
    }
}

pub fn handle_boxes(transform: &ScalingTransform, rect: &DisplayRect, handle_size: f64) -> HandleBoxes {
    let half = handle_size / 2.0;
    let centered_on = |x: f64, y: f64| Block {
        left: transform.origin_x + x - half,
        top: y - half,
        width: handle_size,
        height: handle_size,
    };
    HandleBoxes {
        top_left: centered_on(rect.x, rect.y),
        bottom_right: centered_on(rect.right(), rect.bottom()),
    }
}
