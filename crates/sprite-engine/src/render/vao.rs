use crate::device::{Backend, VertexArrayId};
use crate::shader::{Program, UniformValue};

use super::{GpuBuffer, Texture};

/// Vertex array: named buffers, the program that reads them and a texture.
///
/// Buffers are bound to the program attribute of the same name, so the
/// program must be attached and its attributes registered before `init`.
#[derive(Debug, Default)]
pub struct Vao {
    id: Option<VertexArrayId>,
    buffers: Vec<(String, GpuBuffer)>,
    program: Option<Program>,
    texture: Option<Texture>,
}

impl Vao {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<VertexArrayId> {
        self.id
    }

    pub fn add_buffer(&mut self, name: &str, buffer: GpuBuffer) {
        assert!(
            self.buffers.iter().all(|(n, _)| n != name),
            "buffer {name} added twice"
        );
        self.buffers.push((name.to_owned(), buffer));
    }

    pub fn buffer(&self, name: &str) -> &GpuBuffer {
        match self.buffers.iter().find(|(n, _)| n == name) {
            Some((_, buffer)) => buffer,
            None => panic!("vertex array has no buffer {name}"),
        }
    }

    pub fn buffer_mut(&mut self, name: &str) -> &mut GpuBuffer {
        match self.buffers.iter_mut().find(|(n, _)| n == name) {
            Some((_, buffer)) => buffer,
            None => panic!("vertex array has no buffer {name}"),
        }
    }

    pub fn attach_shader(&mut self, program: Program) {
        self.program = Some(program);
    }

    pub fn program(&self) -> &Program {
        match &self.program {
            Some(program) => program,
            None => panic!("vertex array has no shader attached"),
        }
    }

    pub fn program_mut(&mut self) -> &mut Program {
        match &mut self.program {
            Some(program) => program,
            None => panic!("vertex array has no shader attached"),
        }
    }

    pub fn set_texture(&mut self, texture: Texture) {
        self.texture = Some(texture);
    }

    pub fn texture(&self) -> Option<Texture> {
        self.texture
    }

    /// Registers a uniform on the attached program and pushes it once.
    pub fn add_uniform(&mut self, gpu: &mut dyn Backend, name: &str, value: UniformValue) {
        self.program_mut().add_uniform(gpu, name, value);
    }

    /// Stages a uniform value for the next draw.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.program_mut().set_uniform(name, value);
    }

    pub fn pixel_to_tex_coord(&self, x: f32, y: f32) -> (f32, f32) {
        match &self.texture {
            Some(texture) => texture.pixel_to_tex_coord(x, y),
            None => panic!("pixel_to_tex_coord on a vertex array without a texture"),
        }
    }

    /// True when any buffer has changes the GPU has not seen.
    pub fn is_dirty(&self) -> bool {
        self.buffers.iter().any(|(_, b)| !b.is_uploaded())
    }

    fn bind(&mut self, gpu: &mut dyn Backend) -> VertexArrayId {
        let id = *self.id.get_or_insert_with(|| gpu.create_vertex_array());
        gpu.bind_vertex_array(id);
        id
    }

    /// Creates the vertex array and every buffer.
    pub fn init(&mut self, gpu: &mut dyn Backend) {
        let id = self.bind(gpu);
        let Self {
            buffers, program, ..
        } = self;
        let program = match program {
            Some(program) => program,
            None => panic!("vertex array initialised without a shader"),
        };
        for (name, buffer) in buffers.iter_mut() {
            buffer.create(gpu, program.attribute_location(name));
        }
        log::trace!("vertex array {} initialised", id.raw());
    }

    /// Binds the vertex array, then re-uploads every buffer.
    pub fn update_buffers(&mut self, gpu: &mut dyn Backend) {
        self.bind(gpu);
        let Self {
            buffers, program, ..
        } = self;
        let program = match program {
            Some(program) => program,
            None => panic!("vertex array updated without a shader"),
        };
        for (name, buffer) in buffers.iter_mut() {
            buffer.update(gpu, program.attribute_location(name));
        }
    }

    /// Activates the program, vertex array and texture for a draw.
    pub fn prep_render(&mut self, gpu: &mut dyn Backend) {
        self.program().use_program(gpu);
        self.bind(gpu);
        if let Some(texture) = &self.texture {
            texture.bind(gpu);
        }
    }

    /// Vertices drawn by `render`: the shortest buffer bounds the draw.
    pub fn vertex_count(&self) -> usize {
        self.buffers
            .iter()
            .map(|(_, b)| b.vertex_count())
            .min()
            .unwrap_or(0)
    }

    /// Applies staged uniforms, then draws every vertex as a triangle list.
    pub fn render(&mut self, gpu: &mut dyn Backend) {
        self.program_mut().apply_uniforms(gpu);
        let count = self.vertex_count();
        if count > 0 {
            gpu.draw_triangles(count as u32);
        }
    }

    /// Releases the buffers and the vertex array.
    pub fn delete(&mut self, gpu: &mut dyn Backend) {
        for (_, buffer) in &mut self.buffers {
            buffer.delete(gpu);
        }
        if let Some(id) = self.id.take() {
            gpu.delete_vertex_array(id);
        }
    }
}
