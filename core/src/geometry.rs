//! Screen-space rectangles used for culling and hit tests.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle measured in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

impl ScreenRect {
    /// Creates a rectangle from its top-left corner and extent.
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Lower-torso box used for solid blocking between actors.
    ///
    /// Spans half the footprint width centered on `origin` and the top 30% of
    /// its height, so transparent sprite padding never blocks.
    #[must_use]
    pub fn blocking_box(origin: Vec2, size: Vec2) -> Self {
        Self::new(
            origin.x - size.x * 0.25,
            origin.y,
            size.x * 0.5,
            size.y * 0.3,
        )
    }

    /// Torso box that projectiles are tested against.
    #[must_use]
    pub fn hit_box(origin: Vec2, size: Vec2) -> Self {
        Self::new(
            origin.x - size.x * 0.4,
            origin.y - size.y * 0.1,
            size.x * 0.8,
            size.y * 0.8,
        )
    }

    /// Square of half-extent `radius` centered on `center`.
    #[must_use]
    pub fn around(center: Vec2, radius: f32) -> Self {
        Self::new(
            center.x - radius,
            center.y - radius,
            radius * 2.0,
            radius * 2.0,
        )
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.left
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.top
    }

    /// Horizontal extent.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Reports whether the two rectangles share a region of positive area.
    ///
    /// Negative extents are normalized first, so a rectangle described from
    /// its bottom-right corner behaves like its mirrored equivalent.
    #[must_use]
    pub fn intersects(&self, other: &ScreenRect) -> bool {
        let (a_left, a_right) = span(self.left, self.width);
        let (a_top, a_bottom) = span(self.top, self.height);
        let (b_left, b_right) = span(other.left, other.width);
        let (b_top, b_bottom) = span(other.top, other.height);

        let left = a_left.max(b_left);
        let right = a_right.min(b_right);
        let top = a_top.max(b_top);
        let bottom = a_bottom.min(b_bottom);

        left < right && top < bottom
    }
}

fn span(origin: f32, extent: f32) -> (f32, f32) {
    let end = origin + extent;
    (origin.min(end), origin.max(end))
}

#[cfg(test)]
mod tests {
    use super::ScreenRect;
    use glam::Vec2;

    #[test]
    fn overlapping_rectangles_intersect() {
        let a = ScreenRect::new(0.0, 0.0, 10.0, 10.0);
        let b = ScreenRect::new(5.0, 5.0, 10.0, 10.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = ScreenRect::new(0.0, 0.0, 10.0, 10.0);
        let b = ScreenRect::new(10.0, 0.0, 10.0, 10.0);

        assert!(!a.intersects(&b));
    }

    #[test]
    fn negative_extent_is_normalized() {
        let a = ScreenRect::new(10.0, 10.0, -10.0, -10.0);
        let b = ScreenRect::new(2.0, 2.0, 1.0, 1.0);

        assert!(a.intersects(&b));
    }

    #[test]
    fn blocking_box_covers_lower_torso() {
        let rect = ScreenRect::blocking_box(Vec2::new(100.0, 50.0), Vec2::new(40.0, 60.0));

        assert_eq!(rect, ScreenRect::new(90.0, 50.0, 20.0, 18.0));
    }

    #[test]
    fn hit_box_is_offset_above_origin() {
        let rect = ScreenRect::hit_box(Vec2::new(100.0, 50.0), Vec2::new(50.0, 50.0));

        assert_eq!(rect, ScreenRect::new(80.0, 45.0, 40.0, 40.0));
        assert!(rect.intersects(&ScreenRect::around(Vec2::new(100.0, 46.0), 0.4)));
        assert!(!rect.intersects(&ScreenRect::around(Vec2::new(100.0, 44.0), 0.4)));
    }
}
