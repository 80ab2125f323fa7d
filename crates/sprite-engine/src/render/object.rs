use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;

use crate::coords::{Rect, Vec2, Viewport};
use crate::device::Backend;
use crate::shader::{Program, UniformValue, sprite};

use super::{GpuBuffer, RenderGate, Texture, Transform, Vao};

/// Vertices per quad (two triangles).
pub const QUAD_VERTICES: usize = 6;

#[derive(Debug, Default)]
struct ObjectMode {
    auto_update: bool,
    is_async: bool,
}

/// Update policy shared between an object and its handles.
///
/// Auto-update and job-queue ownership are mutually exclusive; whichever is
/// requested second panics on the requesting thread.
#[derive(Debug, Clone, Default)]
pub(crate) struct ModeCell(Arc<Mutex<ObjectMode>>);

impl ModeCell {
    pub(crate) fn set_auto_update(&self, enabled: bool) {
        let mut mode = self.0.lock();
        if enabled && mode.is_async {
            panic!("cannot auto-update async render object");
        }
        mode.auto_update = enabled;
    }

    pub(crate) fn mark_async(&self) {
        let mut mode = self.0.lock();
        if mode.auto_update {
            panic!("cannot submit auto-update render object to the job queue");
        }
        mode.is_async = true;
    }

    pub(crate) fn auto_update(&self) -> bool {
        self.0.lock().auto_update
    }

    pub(crate) fn is_async(&self) -> bool {
        self.0.lock().is_async
    }
}

/// A batch of textured quads drawn with one vertex array.
///
/// Quads are allocated from a monotonic cursor and never reclaimed;
/// `remove_square` only collapses a quad to zero area. Geometry is in pixels
/// with a bottom-left origin, texture rectangles are in texture pixels with a
/// top-left origin.
#[derive(Debug)]
pub struct RenderObject {
    vao: Vao,
    capacity: usize,
    free_vert: usize,
    should_render: bool,
    mode: ModeCell,
    transform: Option<Transform>,
    gate: Option<RenderGate>,
}

impl RenderObject {
    /// Object using the built-in sprite program with room for `quads` quads.
    pub fn new(gpu: &mut dyn Backend, texture: Texture, quads: usize) -> Result<Self> {
        Self::with_program(gpu, Program::sprite(), texture, quads)
    }

    /// Object using a custom program.
    ///
    /// The program must read the sprite attributes and uniform block; it is
    /// linked here if it was not linked already.
    pub fn with_program(
        gpu: &mut dyn Backend,
        mut program: Program,
        texture: Texture,
        quads: usize,
    ) -> Result<Self> {
        assert!(quads > 0, "render object needs room for at least one quad");
        if program.id().is_none() {
            program.link(gpu)?;
        }
        program.add_attribute(sprite::ATTR_VERT);
        program.add_attribute(sprite::ATTR_TEXCOORD);

        let capacity = quads * QUAD_VERTICES;
        let mut vao = Vao::new();
        vao.attach_shader(program);
        vao.set_texture(texture);
        vao.add_buffer(sprite::ATTR_VERT, GpuBuffer::new(2, capacity));
        vao.add_buffer(sprite::ATTR_TEXCOORD, GpuBuffer::new(2, capacity));
        vao.init(gpu);

        vao.add_uniform(gpu, sprite::ROT, UniformValue::IDENTITY_MAT2);
        vao.add_uniform(gpu, sprite::ROT_CENTER, Vec2::ZERO.into());
        vao.add_uniform(gpu, sprite::TRANS, Vec2::ZERO.into());
        vao.add_uniform(gpu, sprite::DIM, Vec2::ZERO.into());
        vao.add_uniform(gpu, sprite::CAM, Vec2::ZERO.into());
        vao.add_uniform(gpu, sprite::ZOOM, UniformValue::Float(1.0));

        Ok(Self {
            vao,
            capacity,
            free_vert: 0,
            should_render: true,
            mode: ModeCell::default(),
            transform: None,
            gate: None,
        })
    }

    /// Enables translation, camera, zoom, rotation and culling.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.transform.as_mut()
    }

    pub fn vao(&self) -> &Vao {
        &self.vao
    }

    pub fn vao_mut(&mut self) -> &mut Vao {
        &mut self.vao
    }

    pub(crate) fn mode(&self) -> &ModeCell {
        &self.mode
    }

    /// Capacity in vertices.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Next vertex index `create_rect` will hand out.
    pub fn free_vertex(&self) -> usize {
        self.free_vert
    }

    pub fn should_render(&self) -> bool {
        self.should_render
    }

    pub fn set_should_render(&mut self, should_render: bool) {
        self.should_render = should_render;
    }

    pub fn auto_update(&self) -> bool {
        self.mode.auto_update()
    }

    pub fn is_async(&self) -> bool {
        self.mode.is_async()
    }

    /// Uploads dirty buffers at draw time. Not allowed on async objects.
    pub fn set_auto_update(&mut self, enabled: bool) {
        self.mode.set_auto_update(enabled);
    }

    pub(crate) fn set_gate(&mut self, gate: RenderGate) {
        self.gate = Some(gate);
    }

    pub(crate) fn has_gate(&self) -> bool {
        self.gate.is_some()
    }

    pub fn pixel_to_tex_coord(&self, x: f32, y: f32) -> (f32, f32) {
        self.vao.pixel_to_tex_coord(x, y)
    }

    /// Writes one vertex; `tex` is in texture pixels.
    pub fn set_vertex(&mut self, index: usize, position: Vec2, tex: Vec2) {
        assert!(
            index < self.capacity,
            "vertex {index} past capacity {}",
            self.capacity
        );
        let (u, v) = self.pixel_to_tex_coord(tex.x, tex.y);
        self.vao
            .buffer_mut(sprite::ATTR_VERT)
            .write(index * 2, &position.to_array());
        self.vao
            .buffer_mut(sprite::ATTR_TEXCOORD)
            .write(index * 2, &[u, v]);
    }

    /// Position and UV of vertex `index` as stored on the CPU side.
    pub fn vertex(&self, index: usize) -> (Vec2, [f32; 2]) {
        let i = index * 2;
        let pos = self.vao.buffer(sprite::ATTR_VERT).as_slice();
        let uv = self.vao.buffer(sprite::ATTR_TEXCOORD).as_slice();
        (Vec2::new(pos[i], pos[i + 1]), [uv[i], uv[i + 1]])
    }

    /// Allocates a quad and returns its first vertex index.
    pub fn create_rect(&mut self, rect: Rect, tex: Rect) -> usize {
        assert!(
            self.free_vert + QUAD_VERTICES <= self.capacity,
            "render object is full ({} vertices)",
            self.capacity
        );
        let index = self.free_vert;
        self.free_vert += QUAD_VERTICES;
        self.modify_rect(index, rect, tex);
        index
    }

    /// Rewrites the quad starting at `index` in place.
    ///
    /// Winding: bottom-left, bottom-right, top-left, top-left, bottom-right,
    /// top-right. The bottom edge samples `tex.y + tex.h`, the top edge
    /// samples `tex.y`.
    pub fn modify_rect(&mut self, index: usize, rect: Rect, tex: Rect) {
        assert!(
            index + QUAD_VERTICES <= self.capacity,
            "quad at vertex {index} exceeds capacity {}",
            self.capacity
        );
        let (x0, y0) = (rect.origin.x, rect.origin.y);
        let (x1, y1) = (x0 + rect.size.x, y0 + rect.size.y);

        let (u0, v_top) = self.pixel_to_tex_coord(tex.origin.x, tex.origin.y);
        let (u1, v_bottom) = self.pixel_to_tex_coord(tex.far().x, tex.far().y);

        let positions = [x0, y0, x1, y0, x0, y1, x0, y1, x1, y0, x1, y1];
        let coords = [
            u0, v_bottom, u1, v_bottom, u0, v_top, u0, v_top, u1, v_bottom, u1, v_top,
        ];
        self.vao
            .buffer_mut(sprite::ATTR_VERT)
            .write(index * 2, &positions);
        self.vao
            .buffer_mut(sprite::ATTR_TEXCOORD)
            .write(index * 2, &coords);
    }

    /// Collapses the quad at `index` to six zero vertices. The slot stays
    /// allocated.
    pub fn remove_square(&mut self, index: usize) {
        self.modify_rect(index, Rect::zero(), Rect::zero());
    }

    pub fn create_square(
        &mut self,
        x: f32,
        y: f32,
        side: f32,
        tex_x: f32,
        tex_y: f32,
        tex_side: f32,
    ) -> usize {
        self.create_rect(
            Rect::square(x, y, side),
            Rect::square(tex_x, tex_y, tex_side),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn modify_square(
        &mut self,
        index: usize,
        x: f32,
        y: f32,
        side: f32,
        tex_x: f32,
        tex_y: f32,
        tex_side: f32,
    ) {
        self.modify_rect(
            index,
            Rect::square(x, y, side),
            Rect::square(tex_x, tex_y, tex_side),
        );
    }

    /// Uploads every buffer now. Rendering thread only.
    pub fn update_buffers(&mut self, gpu: &mut dyn Backend) {
        self.vao.update_buffers(gpu);
    }

    /// True unless the object's projected bounds lie entirely outside
    /// `viewport`. Reads the shared cells.
    pub fn is_visible(&self, viewport: Viewport) -> bool {
        match &self.transform {
            Some(transform) => {
                let (translation, camera) = transform.sample();
                Self::in_view(transform, translation, camera, viewport)
            }
            None => true,
        }
    }

    /// Bounds are projected by `translation - camera` and tested against the
    /// area visible at the current zoom. Rotated objects are never culled.
    fn in_view(transform: &Transform, translation: Vec2, camera: Vec2, viewport: Viewport) -> bool {
        let Some(bounds) = transform.bounds() else {
            return true;
        };
        if transform.rotation().0 != 0.0 {
            return true;
        }
        !bounds
            .translated(translation - camera)
            .lies_outside(viewport.zoomed(transform.zoom()))
    }

    /// Draws the object for this frame, reading its own camera cell.
    ///
    /// Waits on the gate first if one is installed. Hidden and culled objects
    /// issue no GPU calls.
    pub fn render(&mut self, gpu: &mut dyn Backend, viewport: Viewport) {
        let camera = self
            .transform
            .as_ref()
            .map_or(Vec2::ZERO, |t| t.camera().get());
        self.render_with_camera(gpu, viewport, camera);
    }

    /// Draws the object against a camera offset sampled once for the whole
    /// frame, so every object of the frame agrees on it.
    pub(crate) fn render_with_camera(&mut self, gpu: &mut dyn Backend, viewport: Viewport, camera: Vec2) {
        if self.gate.as_ref().map(RenderGate::wait) == Some(false) {
            log::debug!("render gate release dropped, removing gate");
            self.gate = None;
        }

        if !self.should_render {
            return;
        }

        if let Some(transform) = &self.transform {
            let translation = transform.translation().get();
            if !Self::in_view(transform, translation, camera, viewport) {
                return;
            }
            let (angle, center) = transform.rotation();
            let zoom = transform.zoom();
            self.vao.set_uniform(sprite::TRANS, translation.into());
            self.vao.set_uniform(sprite::CAM, camera.into());
            self.vao.set_uniform(sprite::ZOOM, UniformValue::Float(zoom));
            self.vao
                .set_uniform(sprite::ROT, UniformValue::rotation(angle));
            self.vao.set_uniform(sprite::ROT_CENTER, center.into());
        }
        self.vao.set_uniform(
            sprite::DIM,
            UniformValue::Vec2([viewport.width, viewport.height]),
        );

        if self.mode.auto_update() && self.vao.is_dirty() {
            self.vao.update_buffers(gpu);
        }

        self.vao.prep_render(gpu);
        self.vao.render(gpu);
    }

    /// Releases all GPU resources of the object.
    pub fn delete(&mut self, gpu: &mut dyn Backend) {
        self.vao.delete(gpu);
    }
}
