use anyhow::Result;

use crate::coords::Viewport;
use crate::device::Backend;
use crate::render::{RenderGate, RenderObject, SharedVec2};

use super::{ObjectDesc, ObjectHandle, ObjectId, Scene};

/// Access to the GPU and the scene on the rendering thread.
///
/// Jobs receive one of these, and `Renderer::context` hands out the same
/// type, so set-up code and queued work share one API.
pub struct RenderContext<'a> {
    gpu: &'a mut dyn Backend,
    scene: &'a mut Scene,
    viewport: Viewport,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(gpu: &'a mut dyn Backend, scene: &'a mut Scene, viewport: Viewport) -> Self {
        Self {
            gpu,
            scene,
            viewport,
        }
    }

    pub fn gpu(&mut self) -> &mut dyn Backend {
        &mut *self.gpu
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scene(&self) -> &Scene {
        &*self.scene
    }

    pub fn camera(&self) -> SharedVec2 {
        self.scene.camera().clone()
    }

    /// Builds an object from `desc` and appends it to the render order.
    pub fn create_object(&mut self, desc: &ObjectDesc) -> Result<ObjectHandle> {
        let object = desc.build(&mut *self.gpu)?;
        Ok(self.scene.add(object))
    }

    /// Appends an already built object to the render order.
    pub fn add_object(&mut self, object: RenderObject) -> ObjectHandle {
        self.scene.add(object)
    }

    pub fn object(&mut self, id: ObjectId) -> Option<&mut RenderObject> {
        self.scene.get_mut(id)
    }

    /// Runs `f` with the object and the GPU. Returns `None` if the object is
    /// not part of this scene.
    pub fn with_object<R>(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(&mut RenderObject, &mut dyn Backend) -> R,
    ) -> Option<R> {
        let object = self.scene.get_mut(id)?;
        Some(f(object, &mut *self.gpu))
    }

    pub fn install_gate(&mut self, id: ObjectId, gate: RenderGate) {
        self.scene.install_gate(id, gate);
    }
}
