//! Data models shared across the crate.
//!
//! - Pixel geometry used by presets, backgrounds and the compositor
//! - Enums for error classification and renderer selection

mod enums;
mod geometry;

pub use enums::{ErrorKind, RenderEngine};
pub use geometry::{Point, Rect, Size};
