//! Interactive editing of the region of interest.
//!
//! The editor keeps the region in original-image coordinates and a display
//! rectangle in screen coordinates. Two handles mutate it:
//!
//! - **Top-left**: moves the top-left corner, the bottom-right corner stays put.
//! - **Bottom-right**: moves the bottom-right corner, the top-left corner stays put.
//!
//! ## Gestures
//!
//! ```text
//! Idle --begin_drag(handle)--> Dragging { anchor, offset }
//! Dragging --drag_move(dx, dy)--> Dragging     (offset = (dx, dy))
//! Dragging --end_drag--> Idle                 (search selection enabled)
//! Dragging --cancel_drag--> Idle              (rectangle restored)
//! ```
//!
//! `begin_drag` records the handle's corner as the anchor. Each move carries
//! the cumulative pointer offset since the gesture began, so the candidate
//! corner is always `anchor + offset` and sub-pixel movement is never lost
//! between events. Starting a second gesture while one is active is rejected
//! and leaves the active one untouched.

use super::overlay::{HandleBoxes, OverlayBlocks, handle_boxes, overlay_blocks};
use super::transform::{DisplayRect, Region, ScalingTransform, Size};
use log::debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragError {
    #[error("a {0:?} drag is already in progress")]
    AlreadyDragging(Handle),
    #[error("no drag in progress")]
    NotDragging,
}

/// The two draggable corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging {
        handle: Handle,
        anchor: (f64, f64),
        offset: (f64, f64),
        /// Rectangle at gesture start, restored by `cancel_drag`.
        start: DisplayRect,
    },
}

/// Region of interest for one displayed image.
#[derive(Debug, Clone)]
pub struct RegionEditor {
    transform: ScalingTransform,
    displayed: Size,
    original: Size,
    container_width: Option<f64>,
    region: Region,
    display: DisplayRect,
    drag: DragState,
    selection_enabled: bool,
}

impl RegionEditor {
    /// Editor for an image of natural size `original` rendered at `displayed`.
    pub fn new(displayed: Size, original: Size, region: Region) -> Self {
        let transform = ScalingTransform::compute(displayed, original);
        let region = region.clamped_to(original);
        Self {
            transform,
            displayed,
            original,
            container_width: None,
            region,
            display: transform.to_display_rect(&region),
            drag: DragState::Idle,
            selection_enabled: false,
        }
    }

    /// Place the rendered image centered in a container of `container_width`.
    pub fn with_container_width(mut self, container_width: f64) -> Self {
        self.container_width = Some(container_width);
        self.transform = self
            .transform
            .centered_in(container_width, self.displayed.width);
        self
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn display_rect(&self) -> DisplayRect {
        self.display
    }

    pub fn transform(&self) -> ScalingTransform {
        self.transform
    }

    pub fn displayed_size(&self) -> Size {
        self.displayed
    }

    pub fn original_size(&self) -> Size {
        self.original
    }

    pub fn active_handle(&self) -> Option<Handle> {
        match self.drag {
            DragState::Idle => None,
            DragState::Dragging { handle, .. } => Some(handle),
        }
    }

    /// True once a drag has completed since the region was last set.
    pub fn selection_enabled(&self) -> bool {
        self.selection_enabled
    }

    /// Replace the region wholesale, e.g. with the one a search responded
    /// with. Any gesture in progress is dropped.
    pub fn set_region(&mut self, region: Region) {
        self.region = region.clamped_to(self.original);
        self.display = self.transform.to_display_rect(&self.region);
        self.drag = DragState::Idle;
        self.selection_enabled = false;
    }

    /// The rendered size changed: recompute the transform, re-center it in
    /// the container and recompute the display rectangle. The region itself
    /// is unaffected.
    pub fn relayout(&mut self, displayed: Size) {
        let transform = ScalingTransform::compute(displayed, self.original);
        self.transform = match self.container_width {
            Some(width) => transform.centered_in(width, displayed.width),
            None => transform,
        };
        self.displayed = displayed;
        self.display = self.transform.to_display_rect(&self.region);
    }

    pub fn overlay(&self) -> OverlayBlocks {
        overlay_blocks(&self.transform, self.displayed, &self.display)
    }

    pub fn handles(&self, handle_size: f64) -> HandleBoxes {
        handle_boxes(&self.transform, &self.display, handle_size)
    }

    /// Move the top-left corner to display position `(x, y)`.
    ///
    /// The corner is clamped to the image origin and to the bottom-right
    /// corner, which stays where it was.
    pub fn on_drag_top_left(&mut self, x: f64, y: f64) -> Region {
        let right = self.display.right();
        let bottom = self.display.bottom();
        let x = x.clamp(0.0, right.max(0.0));
        let y = y.clamp(0.0, bottom.max(0.0));
        self.display = DisplayRect::new(x, y, right - x, bottom - y);
        self.sync_region()
    }

    /// Move the bottom-right corner to display position `(x, y)`.
    ///
    /// Width and height are measured from the fixed top-left corner and
    /// clamped to `[0, displayed edge]`.
    pub fn on_drag_bottom_right(&mut self, x: f64, y: f64) -> Region {
        let max_width = (self.displayed.width - self.display.x).max(0.0);
        let max_height = (self.displayed.height - self.display.y).max(0.0);
        self.display.width = (x - self.display.x).clamp(0.0, max_width);
        self.display.height = (y - self.display.y).clamp(0.0, max_height);
        self.sync_region()
    }

    fn sync_region(&mut self) -> Region {
        self.region = self
            .transform
            .to_original(&self.display)
            .clamped_to(self.original);
        self.region
    }

    fn corner(&self, handle: Handle) -> (f64, f64) {
        match handle {
            Handle::TopLeft => (self.display.x, self.display.y),
            Handle::BottomRight => (self.display.right(), self.display.bottom()),
        }
    }

    /// Start dragging `handle`.
    pub fn begin_drag(&mut self, handle: Handle) -> Result<(), DragError> {
        if let DragState::Dragging { handle: active, .. } = self.drag {
            return Err(DragError::AlreadyDragging(active));
        }
        let anchor = self.corner(handle);
        debug!("begin {handle:?} drag at ({:.1}, {:.1})", anchor.0, anchor.1);
        self.drag = DragState::Dragging {
            handle,
            anchor,
            offset: (0.0, 0.0),
            start: self.display,
        };
        Ok(())
    }

    /// Pointer moved by `(dx, dy)` in total since the gesture began.
    pub fn drag_move(&mut self, dx: f64, dy: f64) -> Result<Region, DragError> {
        let DragState::Dragging {
            handle,
            anchor,
            start,
            ..
        } = self.drag
        else {
            return Err(DragError::NotDragging);
        };
        self.drag = DragState::Dragging {
            handle,
            anchor,
            offset: (dx, dy),
            start,
        };
        let (x, y) = (anchor.0 + dx, anchor.1 + dy);
        Ok(match handle {
            Handle::TopLeft => self.on_drag_top_left(x, y),
            Handle::BottomRight => self.on_drag_bottom_right(x, y),
        })
    }

    /// Finish the gesture and enable searching the selection.
    pub fn end_drag(&mut self) -> Result<Region, DragError> {
        let DragState::Dragging { handle, offset, .. } = self.drag else {
            return Err(DragError::NotDragging);
        };
        debug!(
            "end {handle:?} drag, moved ({:.1}, {:.1})",
            offset.0, offset.1
        );
        self.drag = DragState::Idle;
        self.selection_enabled = true;
        Ok(self.region)
    }

    /// Abandon the gesture and restore the rectangle it started from.
    pub fn cancel_drag(&mut self) -> Result<Region, DragError> {
        let DragState::Dragging { start, .. } = self.drag else {
            return Err(DragError::NotDragging);
        };
        self.drag = DragState::Idle;
        self.display = start;
        Ok(self.sync_region())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    /// 1000x800 image shown at half size.
    fn half_size_editor(region: Region) -> RegionEditor {
        RegionEditor::new(Size::new(500.0, 400.0), Size::new(1000.0, 800.0), region)
    }

    #[test]
    fn new_editor_projects_region_to_display() {
        let editor = half_size_editor(Region::new(100.0, 200.0, 400.0, 300.0));
        assert_eq!(editor.display_rect(), DisplayRect::new(50.0, 100.0, 200.0, 150.0));
        assert_eq!(editor.active_handle(), None);
        assert!(!editor.selection_enabled());
    }

    #[test]
    fn new_editor_clamps_region_to_image() {
        let editor = half_size_editor(Region::new(900.0, -10.0, 400.0, 300.0));
        assert_eq!(editor.region(), Region::new(900.0, 0.0, 100.0, 300.0));
    }

    #[test]
    fn bottom_right_drag_past_top_left_clamps_to_zero() {
        let editor_region = Region::new(20.0, 20.0, 100.0, 100.0);
        let mut editor = half_size_editor(editor_region);
        // Top-left at display (10, 10)
        assert_eq!(editor.display_rect().x, 10.0);

        let region = editor.on_drag_bottom_right(5.0, 5.0);

        assert_eq!(region.width, 0.0);
        assert_eq!(region.height, 0.0);
        assert_eq!(region.x, 20.0);
        assert_eq!(region.y, 20.0);
    }

    #[test]
    fn bottom_right_drag_clamps_to_displayed_bounds() {
        let mut editor = half_size_editor(Region::new(200.0, 200.0, 100.0, 100.0));

        let region = editor.on_drag_bottom_right(900.0, 900.0);

        assert_eq!(editor.display_rect().right(), 500.0);
        assert_eq!(editor.display_rect().bottom(), 400.0);
        assert_eq!(region, Region::new(200.0, 200.0, 800.0, 600.0));
    }

    #[test]
    fn top_left_drag_keeps_bottom_right_anchored() {
        let mut editor = half_size_editor(Region::new(100.0, 100.0, 400.0, 400.0));
        let before = editor.display_rect();

        let region = editor.on_drag_top_left(25.0, 75.0);

        let after = editor.display_rect();
        assert_close(after.right(), before.right());
        assert_close(after.bottom(), before.bottom());
        assert_eq!(region, Region::new(50.0, 150.0, 450.0, 350.0));
    }

    #[test]
    fn top_left_drag_clamps_to_origin() {
        let mut editor = half_size_editor(Region::new(100.0, 100.0, 400.0, 400.0));

        let region = editor.on_drag_top_left(-40.0, -1.0);

        assert_eq!(region, Region::new(0.0, 0.0, 500.0, 500.0));
    }

    #[test]
    fn top_left_drag_past_bottom_right_collapses() {
        let mut editor = half_size_editor(Region::new(100.0, 100.0, 100.0, 100.0));

        let region = editor.on_drag_top_left(400.0, 300.0);

        assert_eq!(region, Region::new(200.0, 200.0, 0.0, 0.0));
    }

    #[test]
    fn anisotropic_drag_converts_each_axis() {
        // h_scale 0.5, v_scale 0.8
        let mut editor =
            RegionEditor::new(Size::new(500.0, 600.0), Size::new(1000.0, 750.0), Region::default());

        editor.on_drag_bottom_right(150.0, 150.0);
        let region = editor.on_drag_top_left(100.0, 100.0);

        assert_close(region.x, 200.0);
        assert_close(region.y, 125.0);
        assert_close(region.width, 100.0);
        assert_close(region.height, 62.5);
    }

    #[test]
    fn gesture_uses_anchor_plus_cumulative_offset() {
        let mut editor = half_size_editor(Region::new(100.0, 100.0, 200.0, 200.0));
        // Bottom-right corner at display (150, 150)
        editor.begin_drag(Handle::BottomRight).unwrap();
        editor.drag_move(10.0, 5.0).unwrap();
        editor.drag_move(20.5, 10.25).unwrap();
        let region = editor.end_drag().unwrap();

        // Final corner = (150 + 20.5, 150 + 10.25), not the sum of increments
        assert_close(editor.display_rect().right(), 170.5);
        assert_close(editor.display_rect().bottom(), 160.25);
        assert_close(region.width, 241.0);
        assert_close(region.height, 220.5);
        assert!(editor.selection_enabled());
    }

    #[test]
    fn consecutive_gestures_start_from_last_position() {
        let mut editor = half_size_editor(Region::new(100.0, 100.0, 200.0, 200.0));

        editor.begin_drag(Handle::TopLeft).unwrap();
        editor.drag_move(-20.0, -20.0).unwrap();
        editor.end_drag().unwrap();

        editor.begin_drag(Handle::TopLeft).unwrap();
        let region = editor.drag_move(5.0, 0.0).unwrap();
        editor.end_drag().unwrap();

        // 50 - 20 + 5 = 35 display → 70 original; y 50 - 20 = 30 → 60
        assert_close(region.x, 70.0);
        assert_close(region.y, 60.0);
        assert_close(region.width, 230.0);
        assert_close(region.height, 240.0);
    }

    #[test]
    fn second_drag_is_rejected_while_active() {
        let mut editor = half_size_editor(Region::new(100.0, 100.0, 200.0, 200.0));
        editor.begin_drag(Handle::TopLeft).unwrap();
        editor.drag_move(4.0, 4.0).unwrap();

        let result = editor.begin_drag(Handle::BottomRight);

        assert_eq!(result, Err(DragError::AlreadyDragging(Handle::TopLeft)));
        assert_eq!(editor.active_handle(), Some(Handle::TopLeft));
        // The active gesture keeps its anchor
        let region = editor.drag_move(8.0, 8.0).unwrap();
        assert_close(region.x, 116.0);
    }

    #[test]
    fn moves_outside_a_gesture_are_rejected() {
        let mut editor = half_size_editor(Region::new(100.0, 100.0, 200.0, 200.0));
        assert_eq!(editor.drag_move(1.0, 1.0), Err(DragError::NotDragging));
        assert_eq!(editor.end_drag(), Err(DragError::NotDragging));
        assert_eq!(editor.cancel_drag(), Err(DragError::NotDragging));
    }

    #[test]
    fn cancel_restores_rectangle() {
        let original = Region::new(100.0, 100.0, 200.0, 200.0);
        let mut editor = half_size_editor(original);
        editor.begin_drag(Handle::BottomRight).unwrap();
        editor.drag_move(60.0, 60.0).unwrap();

        let region = editor.cancel_drag().unwrap();

        assert_eq!(region, original);
        assert_eq!(editor.active_handle(), None);
        assert!(!editor.selection_enabled());
    }

    #[test]
    fn set_region_replaces_and_resets() {
        let mut editor = half_size_editor(Region::default());
        editor.begin_drag(Handle::TopLeft).unwrap();
        editor.drag_move(10.0, 10.0).unwrap();
        editor.end_drag().unwrap();

        editor.set_region(Region::new(0.0, 0.0, 1000.0, 800.0));

        assert_eq!(editor.display_rect(), DisplayRect::new(0.0, 0.0, 500.0, 400.0));
        assert!(!editor.selection_enabled());
    }

    #[test]
    fn relayout_keeps_region_and_recenters() {
        let region = Region::new(100.0, 100.0, 200.0, 200.0);
        let mut editor = half_size_editor(region).with_container_width(800.0);
        // (800 - 500 + 30) / 2
        assert_eq!(editor.transform().origin_x, 165.0);

        editor.relayout(Size::new(250.0, 200.0));

        assert_eq!(editor.region(), region);
        assert_eq!(editor.display_rect(), DisplayRect::new(25.0, 25.0, 50.0, 50.0));
        // (800 - 250 + 30) / 2
        assert_eq!(editor.transform().origin_x, 290.0);

        let fresh = RegionEditor::new(Size::new(250.0, 200.0), Size::new(1000.0, 800.0), region)
            .with_container_width(800.0);
        assert_eq!(editor.overlay(), fresh.overlay());
        assert_eq!(editor.handles(10.0), fresh.handles(10.0));
    }

    #[test]
    fn relayout_without_container_keeps_zero_origin() {
        let mut editor = half_size_editor(Region::new(0.0, 0.0, 100.0, 100.0));
        editor.relayout(Size::new(250.0, 200.0));
        assert_eq!(editor.transform().origin_x, 0.0);
    }

    #[test]
    fn overlay_follows_display_rect() {
        let editor =
            half_size_editor(Region::new(100.0, 100.0, 200.0, 200.0)).with_container_width(530.0);

        let overlay = editor.overlay();
        let handles = editor.handles(10.0);

        // origin = (530 - 500 + 30) / 2 = 30
        assert_eq!(overlay.top.left, 30.0);
        assert_eq!(overlay.top.height, 50.0);
        assert_eq!(overlay.right.left, 30.0 + 150.0);
        assert_eq!(handles.top_left.left, 30.0 + 50.0 - 5.0);
    }
}
