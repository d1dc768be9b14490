//! Region-of-interest editing.
//!
//! The region a visual search is scoped to lives in original-image pixels,
//! but the user sees and drags it on a scaled rendering of the image.
//!
//! - [`transform`]: [`Region`], [`DisplayRect`] and the [`ScalingTransform`] between them
//! - [`editor`]: [`RegionEditor`], the two-handle drag state machine
//! - [`overlay`]: dimming blocks and handle boxes for rendering

pub mod editor;
pub mod overlay;
pub mod transform;

pub use editor::{DragError, Handle, RegionEditor};
pub use overlay::{Block, HandleBoxes, OverlayBlocks};
pub use transform::{DisplayRect, Region, ScalingTransform, Size};
