use anyhow::Result;

use crate::coords::{Rect, Viewport};
use crate::device::Backend;
use crate::render::{RenderGate, RenderObject, SharedVec2, TextureSource, Transform};

use super::{ObjectHandle, ObjectId};

/// Plain description of a render object, buildable on any thread.
#[derive(Debug, Clone)]
pub struct ObjectDesc {
    pub texture: TextureSource,
    pub quads: usize,
    pub translation: Option<SharedVec2>,
    pub bounds: Option<Rect>,
}

impl ObjectDesc {
    pub fn new(texture: TextureSource, quads: usize) -> Self {
        Self {
            texture,
            quads,
            translation: None,
            bounds: None,
        }
    }

    /// Moves the object with `cell` (enables the transform capability).
    pub fn with_translation(mut self, cell: SharedVec2) -> Self {
        self.translation = Some(cell);
        self
    }

    /// Culls against `bounds` (enables the transform capability).
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    fn wants_transform(&self) -> bool {
        self.translation.is_some() || self.bounds.is_some()
    }

    /// Loads the texture and builds the object.
    pub fn build(&self, gpu: &mut dyn Backend) -> Result<RenderObject> {
        let texture = self.texture.load(gpu)?;
        let object = RenderObject::new(gpu, texture, self.quads)?;
        if !self.wants_transform() {
            return Ok(object);
        }

        let mut transform = Transform::new(self.translation.clone().unwrap_or_default());
        if let Some(bounds) = self.bounds {
            transform = transform.with_bounds(bounds);
        }
        Ok(object.with_transform(transform))
    }
}

/// Live render objects in registration order, plus the shared camera.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<(ObjectId, RenderObject)>,
    next_id: u64,
    camera: SharedVec2,
}

impl Scene {
    pub fn new(camera: SharedVec2) -> Self {
        Self {
            camera,
            ..Self::default()
        }
    }

    /// Camera offset applied to every transformed object.
    pub fn camera(&self) -> &SharedVec2 {
        &self.camera
    }

    /// Registers an object at the end of the render order. Transformed
    /// objects are switched to the scene camera.
    pub fn add(&mut self, mut object: RenderObject) -> ObjectHandle {
        if let Some(transform) = object.transform_mut() {
            transform.set_camera(self.camera.clone());
        }
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let handle = ObjectHandle::new(id, &object);
        log::debug!(
            "registered render object {} ({} vertices)",
            id.raw(),
            object.capacity()
        );
        self.objects.push((id, object));
        handle
    }

    pub fn get(&self, id: ObjectId) -> Option<&RenderObject> {
        self.objects
            .iter()
            .find(|(oid, _)| *oid == id)
            .map(|(_, o)| o)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut RenderObject> {
        self.objects
            .iter_mut()
            .find(|(oid, _)| *oid == id)
            .map(|(_, o)| o)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.iter().map(|(id, _)| *id)
    }

    /// Installs the wait-gate on object `id`.
    ///
    /// Only one object may hold a gate; a second one would deadlock the
    /// frame loop.
    pub fn install_gate(&mut self, id: ObjectId, gate: RenderGate) {
        if let Some((holder, _)) = self.objects.iter().find(|(_, o)| o.has_gate()) {
            panic!(
                "render gate already installed on object {}, refusing a second gate",
                holder.raw()
            );
        }
        match self.get_mut(id) {
            Some(object) => object.set_gate(gate),
            None => panic!("no render object {} to gate", id.raw()),
        }
    }

    /// Draws every object in registration order. The camera is read once, so
    /// a producer moving it mid-frame takes effect next frame.
    pub(crate) fn render(&mut self, gpu: &mut dyn Backend, viewport: Viewport) {
        let camera = self.camera.get();
        for (_, object) in &mut self.objects {
            object.render_with_camera(gpu, viewport, camera);
        }
    }

    /// Releases the GPU resources of every object and empties the scene.
    pub(crate) fn delete_all(&mut self, gpu: &mut dyn Backend) {
        let count = self.objects.len();
        for (_, mut object) in self.objects.drain(..) {
            object.delete(gpu);
        }
        if count > 0 {
            log::debug!("deleted {count} render objects");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::coords::ColorRgba;
    use crate::device::recording::RecordingBackend;
    use crate::device::{BufferId, ProgramId, ShaderSource, TextureId, VertexArrayId};
    use crate::render::render_gate;
    use crate::shader::sprite;

    /// Moves the camera every time something is drawn, like a producer
    /// thread racing the draw pass.
    struct CameraMover {
        inner: RecordingBackend,
        camera: SharedVec2,
    }

    impl Backend for CameraMover {
        fn create_vertex_array(&mut self) -> VertexArrayId {
            self.inner.create_vertex_array()
        }
        fn bind_vertex_array(&mut self, id: VertexArrayId) {
            self.inner.bind_vertex_array(id)
        }
        fn delete_vertex_array(&mut self, id: VertexArrayId) {
            self.inner.delete_vertex_array(id)
        }
        fn create_buffer(&mut self, contents: &[f32]) -> BufferId {
            self.inner.create_buffer(contents)
        }
        fn write_buffer(&mut self, id: BufferId, offset: usize, contents: &[f32]) {
            self.inner.write_buffer(id, offset, contents)
        }
        fn delete_buffer(&mut self, id: BufferId) {
            self.inner.delete_buffer(id)
        }
        fn vertex_attribute(&mut self, location: u32, buffer: BufferId, dimension: u32) {
            self.inner.vertex_attribute(location, buffer, dimension)
        }
        fn compile_program(
            &mut self,
            vertex: &ShaderSource,
            fragment: &ShaderSource,
        ) -> Result<ProgramId> {
            self.inner.compile_program(vertex, fragment)
        }
        fn use_program(&mut self, id: ProgramId) {
            self.inner.use_program(id)
        }
        fn write_uniform(&mut self, program: ProgramId, slot: u32, value: [f32; 4]) {
            self.inner.write_uniform(program, slot, value)
        }
        fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId {
            self.inner.create_texture(width, height, rgba)
        }
        fn bind_texture(&mut self, id: TextureId) {
            self.inner.bind_texture(id)
        }
        fn clear(&mut self, color: ColorRgba) {
            self.inner.clear(color)
        }
        fn draw_triangles(&mut self, vertex_count: u32) {
            self.inner.draw_triangles(vertex_count);
            let moved = self.camera.get() + Vec2::new(100.0, 0.0);
            self.camera.set(moved);
        }
    }

    fn desc() -> ObjectDesc {
        ObjectDesc::new(TextureSource::solid(4, 4, [9, 9, 9, 255]), 1)
    }

    #[test]
    fn ids_follow_registration_order() {
        let mut gpu = RecordingBackend::new();
        let mut scene = Scene::default();
        let a = scene.add(desc().build(&mut gpu).unwrap());
        let b = scene.add(desc().build(&mut gpu).unwrap());
        assert_eq!(scene.ids().collect::<Vec<_>>(), vec![a.id(), b.id()]);
    }

    #[test]
    fn plain_desc_has_no_transform() {
        let mut gpu = RecordingBackend::new();
        assert!(desc().build(&mut gpu).unwrap().transform().is_none());
    }

    #[test]
    fn added_objects_follow_scene_camera() {
        let mut gpu = RecordingBackend::new();
        let camera = SharedVec2::default();
        let mut scene = Scene::new(camera.clone());
        let object = desc()
            .with_translation(SharedVec2::default())
            .build(&mut gpu)
            .unwrap();
        let handle = scene.add(object);

        camera.set(Vec2::new(3.0, 4.0));
        let transform = scene.get(handle.id()).unwrap().transform().unwrap();
        assert_eq!(transform.camera().get(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn handle_shares_translation_cell() {
        let mut gpu = RecordingBackend::new();
        let mut scene = Scene::default();
        let cell = SharedVec2::default();
        let handle = scene.add(desc().with_translation(cell.clone()).build(&mut gpu).unwrap());
        handle.translation().unwrap().set(Vec2::new(7.0, 0.0));
        assert_eq!(cell.get(), Vec2::new(7.0, 0.0));
    }

    #[test]
    fn delete_all_releases_every_buffer() {
        let mut gpu = RecordingBackend::new();
        let mut scene = Scene::default();
        scene.add(desc().build(&mut gpu).unwrap());
        scene.add(desc().build(&mut gpu).unwrap());
        scene.delete_all(&mut gpu);
        assert!(scene.is_empty());
        assert!(gpu.buffers.is_empty());
    }

    #[test]
    #[should_panic(expected = "already installed")]
    fn second_gate_panics() {
        let mut gpu = RecordingBackend::new();
        let mut scene = Scene::default();
        let a = scene.add(desc().build(&mut gpu).unwrap());
        let b = scene.add(desc().build(&mut gpu).unwrap());
        scene.install_gate(a.id(), render_gate().0);
        scene.install_gate(b.id(), render_gate().0);
    }

    #[test]
    fn every_object_in_a_frame_sees_the_same_camera() {
        let camera = SharedVec2::new(Vec2::new(5.0, 0.0));
        let mut gpu = CameraMover {
            inner: RecordingBackend::new(),
            camera: camera.clone(),
        };
        let mut scene = Scene::new(camera.clone());
        for _ in 0..3 {
            let object = desc()
                .with_translation(SharedVec2::default())
                .build(&mut gpu)
                .unwrap();
            scene.add(object);
        }
        gpu.inner.clear_calls();

        scene.render(&mut gpu, Viewport::new(800.0, 600.0));

        let slot = sprite::UNIFORMS
            .iter()
            .position(|u| *u == sprite::CAM)
            .unwrap() as u32;
        assert_eq!(gpu.inner.draws().len(), 3);
        assert_eq!(gpu.inner.uniform_writes(slot), vec![[5.0, 0.0, 0.0, 0.0]; 3]);
        assert_eq!(camera.get(), Vec2::new(305.0, 0.0));
    }
}
