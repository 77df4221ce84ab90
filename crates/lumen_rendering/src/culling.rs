//! View-bounds culling for world objects.
//!
//! The camera sees an axis-aligned box centered on its world position with
//! the viewport's half-size as extents. An object survives if its own box
//! overlaps that view box on both axes.

use lumen_core::{Size, Vec2};

/// Axis-aligned view box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    /// World position of the view center.
    pub center: Vec2,
    /// Half of the viewport size.
    pub half_extents: Vec2,
}

impl ViewBounds {
    /// View box of a camera at `center` showing `viewport`.
    #[must_use]
    pub fn new(center: Vec2, viewport: Size) -> Self {
        Self {
            center,
            half_extents: viewport.half(),
        }
    }

    /// Tests an object's box against the view box.
    ///
    /// Rotated objects are tested with the box around their bounding circle,
    /// which never culls anything visible.
    #[inline]
    #[must_use]
    pub fn test_object(&self, position: Vec2, size: Size, rotation: f32) -> bool {
        let half = object_half_extents(size, rotation);
        let distance = (position - self.center).abs();
        distance.x <= self.half_extents.x + half.x && distance.y <= self.half_extents.y + half.y
    }

    /// Maps a world position to screen space (top-left origin).
    #[inline]
    #[must_use]
    pub fn to_screen(&self, position: Vec2) -> Vec2 {
        position - self.center + self.half_extents
    }
}

fn object_half_extents(size: Size, rotation: f32) -> Vec2 {
    let half = size.half();
    if rotation == 0.0 {
        half
    } else {
        let radius = half.length_squared().sqrt();
        Vec2::new(radius, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewBounds {
        ViewBounds::new(Vec2::ZERO, Size::new(100.0, 50.0))
    }

    #[test]
    fn test_inside_and_outside() {
        let view = view();
        let size = Size::new(10.0, 10.0);
        assert!(view.test_object(Vec2::ZERO, size, 0.0));
        assert!(view.test_object(Vec2::new(54.0, 0.0), size, 0.0));
        assert!(!view.test_object(Vec2::new(56.0, 0.0), size, 0.0));
        assert!(!view.test_object(Vec2::new(0.0, -31.0), size, 0.0));
    }

    #[test]
    fn test_touching_edge_is_kept() {
        let view = view();
        assert!(view.test_object(Vec2::new(55.0, 0.0), Size::new(10.0, 10.0), 0.0));
    }

    #[test]
    fn test_rotation_widens_bounds() {
        let view = view();
        let size = Size::new(10.0, 10.0);
        let position = Vec2::new(56.0, 0.0);
        assert!(!view.test_object(position, size, 0.0));
        assert!(view.test_object(position, size, std::f32::consts::FRAC_PI_4));
    }

    #[test]
    fn test_to_screen() {
        let view = ViewBounds::new(Vec2::new(10.0, 10.0), Size::new(100.0, 50.0));
        assert_eq!(view.to_screen(Vec2::new(10.0, 10.0)), Vec2::new(50.0, 25.0));
        assert_eq!(view.to_screen(Vec2::new(0.0, 0.0)), Vec2::new(40.0, 15.0));
    }
}
