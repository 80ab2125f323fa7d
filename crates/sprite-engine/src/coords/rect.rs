use super::{Vec2, Viewport};

/// Axis-aligned rectangle in pixels.
///
/// For geometry, `origin` is the bottom-left corner. For texture regions the
/// same struct is read with a top-left origin (see [`crate::coords`]).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Square with side `side` at `(x, y)`.
    #[inline]
    pub const fn square(x: f32, y: f32, side: f32) -> Self {
        Self::new(x, y, side, side)
    }

    /// Zero-area rectangle at the origin.
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Corner opposite `origin`.
    #[inline]
    pub fn far(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn translated(self, offset: Vec2) -> Self {
        Self::from_origin_size(self.origin + offset, self.size)
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Coarse AABB rejection against `[0, width] x [0, height]`.
    ///
    /// True only when both edges of the rectangle lie past the same side of the
    /// viewport on some axis. Anything touching or straddling an edge is kept.
    pub fn lies_outside(self, viewport: Viewport) -> bool {
        let near = self.origin;
        let far = self.far();

        let past = |a: f32, b: f32, limit: f32| a > limit && b > limit;
        let before = |a: f32, b: f32| a < 0.0 && b < 0.0;

        past(near.x, far.x, viewport.width)
            || before(near.x, far.x)
            || past(near.y, far.y, viewport.height)
            || before(near.y, far.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport::new(800.0, 600.0);

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(x, y, w, h)
    }

    #[test]
    fn far_corner_adds_size() {
        assert_eq!(r(10.0, 20.0, 5.0, 7.0).far(), Vec2::new(15.0, 27.0));
    }

    #[test]
    fn translated_moves_origin_only() {
        let moved = r(1.0, 2.0, 3.0, 4.0).translated(Vec2::new(10.0, -2.0));
        assert_eq!(moved, r(11.0, 0.0, 3.0, 4.0));
    }

    #[test]
    fn inside_is_not_outside() {
        assert!(!r(100.0, 100.0, 32.0, 32.0).lies_outside(VIEW));
    }

    #[test]
    fn fully_right_is_outside() {
        assert!(r(801.0, 0.0, 32.0, 32.0).lies_outside(VIEW));
    }

    #[test]
    fn fully_left_is_outside() {
        assert!(r(-100.0, 0.0, 32.0, 32.0).lies_outside(VIEW));
    }

    #[test]
    fn fully_above_and_below_are_outside() {
        assert!(r(0.0, 700.0, 32.0, 32.0).lies_outside(VIEW));
        assert!(r(0.0, -50.0, 32.0, 32.0).lies_outside(VIEW));
    }

    #[test]
    fn straddling_right_edge_is_kept() {
        assert!(!r(790.0, 10.0, 32.0, 32.0).lies_outside(VIEW));
    }

    #[test]
    fn straddling_bottom_edge_is_kept() {
        assert!(!r(10.0, -16.0, 32.0, 32.0).lies_outside(VIEW));
    }

    #[test]
    fn larger_than_viewport_is_kept() {
        assert!(!r(-100.0, -100.0, 2000.0, 2000.0).lies_outside(VIEW));
    }
}
