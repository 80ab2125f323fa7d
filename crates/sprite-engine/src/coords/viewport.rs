/// Drawable area in physical pixels.
///
/// Sprite shaders divide by this size to reach NDC, and culling tests
/// projected bounds against it.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the area visible at `zoom` (zoom scales around the origin).
    #[inline]
    pub fn zoomed(self, zoom: f32) -> Self {
        if zoom > 0.0 && zoom.is_finite() {
            Self::new(self.width / zoom, self.height / zoom)
        } else {
            self
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}
