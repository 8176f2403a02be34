//! Pixel geometry value types.

use serde::{Deserialize, Serialize};

/// Width × height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether a box of `size` placed at `pos` lies entirely inside this frame.
    pub fn contains(&self, pos: Point, size: Size) -> bool {
        pos.x + size.width <= self.width && pos.y + size.height <= self.height
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Top-left offset in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned region in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Shrink the rect by `amount` on every side, saturating at zero size.
    pub fn inset(&self, amount: u32) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
            width: self.width.saturating_sub(amount * 2),
            height: self.height.saturating_sub(amount * 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let r = Rect::new(640, 130, 560, 330);
        assert_eq!(r.right(), 1200);
        assert_eq!(r.bottom(), 460);
    }

    #[test]
    fn inset_saturates() {
        let r = Rect::new(0, 0, 10, 4).inset(3);
        assert_eq!(r, Rect::new(3, 3, 4, 0));
    }

    #[test]
    fn contains_checks_both_axes() {
        let frame = Size::new(1280, 720);
        assert!(frame.contains(Point::new(70, 80), Size::new(480, 600)));
        assert!(!frame.contains(Point::new(70, 200), Size::new(480, 600)));
        assert!(!frame.contains(Point::new(900, 80), Size::new(480, 600)));
    }
}
