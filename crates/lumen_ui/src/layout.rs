//! Screen-space geometry for node placement.
//!
//! Screen coordinates have their origin at the top-left of the viewport with
//! `y` growing downwards. A node's resolved position is the CENTER of its
//! rectangle.

use lumen_core::{Size, Vec2};

/// A rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// X position (left edge).
    pub x: f32,
    /// Y position (top edge).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Creates the rectangle of `size` centered on `center`.
    #[must_use]
    pub fn from_center(center: Vec2, size: Size) -> Self {
        let half = size.half();
        Self::new(center.x - half.x, center.y - half.y, size.width, size.height)
    }

    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Returns the size.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns true if the point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Returns true if two rectangles intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Placement of a node's rectangle along one axis relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// The rectangle starts at the anchor (left/top edge on it).
    Start,
    /// The rectangle is centered on the anchor.
    #[default]
    Center,
    /// The rectangle ends at the anchor (right/bottom edge on it).
    End,
}

impl Align {
    fn offset(self, half_extent: f32) -> f32 {
        match self {
            Self::Start => half_extent,
            Self::Center => 0.0,
            Self::End => -half_extent,
        }
    }
}

/// Two-axis alignment of a node around its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Alignment {
    /// Horizontal placement.
    pub horizontal: Align,
    /// Vertical placement.
    pub vertical: Align,
}

impl Alignment {
    /// Centered on the anchor.
    pub const CENTER: Self = Self::new(Align::Center, Align::Center);
    /// Top-left corner on the anchor.
    pub const TOP_LEFT: Self = Self::new(Align::Start, Align::Start);
    /// Bottom-right corner on the anchor.
    pub const BOTTOM_RIGHT: Self = Self::new(Align::End, Align::End);

    /// Creates an alignment.
    #[must_use]
    pub const fn new(horizontal: Align, vertical: Align) -> Self {
        Self { horizontal, vertical }
    }

    /// Offset from the anchor to the center of a rectangle of `size`.
    #[must_use]
    pub fn offset(self, size: Size) -> Vec2 {
        let half = size.half();
        Vec2::new(self.horizontal.offset(half.x), self.vertical.offset(half.y))
    }
}

/// Minimum and maximum size a node reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeBounds {
    /// Smallest reported size.
    pub min: Size,
    /// Largest reported size.
    pub max: Size,
}

impl SizeBounds {
    /// No clamping.
    pub const UNBOUNDED: Self = Self {
        min: Size::ZERO,
        max: Size::new(f32::INFINITY, f32::INFINITY),
    };

    /// Exactly `size`.
    #[must_use]
    pub const fn tight(size: Size) -> Self {
        Self { min: size, max: size }
    }

    /// Between `min` and `max`; `max` is raised to `min` where they cross.
    #[must_use]
    pub fn new(min: Size, max: Size) -> Self {
        Self { min, max: max.max(min) }
    }

    /// Clamps a size to these bounds.
    #[must_use]
    pub fn clamp(&self, size: Size) -> Size {
        Size::new(
            size.width.clamp(self.min.width, self.max.width),
            size.height.clamp(self.min.height, self.max.height),
        )
    }
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);

        assert!(rect.contains(Vec2::new(50.0, 30.0)));
        assert!(!rect.contains(Vec2::new(5.0, 30.0)));
        assert!(!rect.contains(Vec2::new(50.0, 80.0)));
    }

    #[test]
    fn test_rect_from_center() {
        let rect = Rect::from_center(Vec2::new(50.0, 50.0), Size::new(20.0, 10.0));
        assert_eq!(rect, Rect::new(40.0, 45.0, 20.0, 10.0));
        assert_eq!(rect.center(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_alignment_offset() {
        let size = Size::new(20.0, 10.0);
        assert_eq!(Alignment::CENTER.offset(size), Vec2::ZERO);
        assert_eq!(Alignment::TOP_LEFT.offset(size), Vec2::new(10.0, 5.0));
        assert_eq!(Alignment::BOTTOM_RIGHT.offset(size), Vec2::new(-10.0, -5.0));
    }

    #[test]
    fn test_size_bounds_clamp() {
        let bounds = SizeBounds::new(Size::new(10.0, 10.0), Size::new(50.0, 5.0));
        // max height raised to min height
        assert_eq!(bounds.clamp(Size::new(100.0, 0.0)), Size::new(50.0, 10.0));
        assert_eq!(SizeBounds::UNBOUNDED.clamp(Size::new(3.0, 4.0)), Size::new(3.0, 4.0));
    }
}
