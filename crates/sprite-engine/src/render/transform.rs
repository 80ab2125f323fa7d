use std::sync::Arc;

use parking_lot::Mutex;

use crate::coords::{Rect, Vec2};

/// A 2-vector written by one thread and read by the rendering thread.
///
/// Only the latest value is observed: the renderer reads the cell once per
/// frame, so intermediate writes may be skipped. Use jobs for discrete
/// changes.
#[derive(Debug, Clone, Default)]
pub struct SharedVec2(Arc<Mutex<Vec2>>);

impl SharedVec2 {
    pub fn new(value: Vec2) -> Self {
        Self(Arc::new(Mutex::new(value)))
    }

    pub fn get(&self) -> Vec2 {
        *self.0.lock()
    }

    pub fn set(&self, value: Vec2) {
        *self.0.lock() = value;
    }

    /// Adds `delta` under a single lock.
    pub fn translate(&self, delta: Vec2) {
        *self.0.lock() += delta;
    }
}

/// Position and view capability of a render object.
///
/// The translation cell is shared with whoever moves the object; the camera
/// cell is shared by every object in a scene.
#[derive(Debug, Clone, Default)]
pub struct Transform {
    translation: SharedVec2,
    camera: SharedVec2,
    bounds: Option<Rect>,
    zoom: f32,
    rotation: f32,
    rotation_center: Vec2,
}

impl Transform {
    pub fn new(translation: SharedVec2) -> Self {
        Self {
            translation,
            zoom: 1.0,
            ..Self::default()
        }
    }

    pub fn with_camera(mut self, camera: SharedVec2) -> Self {
        self.camera = camera;
        self
    }

    /// Object-space rectangle used for culling.
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn translation(&self) -> &SharedVec2 {
        &self.translation
    }

    pub fn camera(&self) -> &SharedVec2 {
        &self.camera
    }

    pub(crate) fn set_camera(&mut self, camera: SharedVec2) {
        self.camera = camera;
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        self.bounds = bounds;
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        assert!(zoom > 0.0 && zoom.is_finite(), "zoom must be positive, got {zoom}");
        self.zoom = zoom;
    }

    pub fn rotation(&self) -> (f32, Vec2) {
        (self.rotation, self.rotation_center)
    }

    /// Counter-clockwise rotation in radians around `center` (object space).
    pub fn set_rotation(&mut self, radians: f32, center: Vec2) {
        self.rotation = radians;
        self.rotation_center = center;
    }

    /// Reads both shared cells once. Returns `(translation, camera)`.
    pub(crate) fn sample(&self) -> (Vec2, Vec2) {
        (self.translation.get(), self.camera.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_clones_share_state() {
        let cell = SharedVec2::default();
        let writer = cell.clone();
        std::thread::spawn(move || writer.set(Vec2::new(3.0, 4.0)))
            .join()
            .unwrap();
        assert_eq!(cell.get(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn translate_accumulates() {
        let cell = SharedVec2::new(Vec2::new(1.0, 1.0));
        cell.translate(Vec2::new(2.0, -1.0));
        cell.translate(Vec2::new(2.0, -1.0));
        assert_eq!(cell.get(), Vec2::new(5.0, -1.0));
    }

    #[test]
    fn sample_reads_both_cells() {
        let translation = SharedVec2::new(Vec2::new(10.0, 0.0));
        let camera = SharedVec2::new(Vec2::new(4.0, 2.0));
        let transform = Transform::new(translation).with_camera(camera.clone());
        camera.set(Vec2::new(5.0, 5.0));
        assert_eq!(
            transform.sample(),
            (Vec2::new(10.0, 0.0), Vec2::new(5.0, 5.0))
        );
    }

    #[test]
    #[should_panic(expected = "zoom must be positive")]
    fn zero_zoom_panics() {
        Transform::default().set_zoom(0.0);
    }
}
