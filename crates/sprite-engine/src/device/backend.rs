use anyhow::Result;

use crate::coords::ColorRgba;

macro_rules! gpu_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

gpu_id!(
    /// GPU vertex buffer object.
    BufferId
);
gpu_id!(
    /// GPU vertex array (attribute → buffer bindings).
    VertexArrayId
);
gpu_id!(
    /// Linked shader program with its own uniform block.
    ProgramId
);
gpu_id!(
    /// Sampled 2D texture.
    TextureId
);

/// Shader code plus the label it is cached under (usually the file path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub label: String,
    pub code: String,
}

impl ShaderSource {
    pub fn new(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
        }
    }
}

/// Number of 16-byte uniform slots available to every program.
pub const MAX_UNIFORM_SLOTS: u32 = 16;

/// GPU operations used by buffers, vertex arrays, programs and the renderer.
///
/// The trait is deliberately state-machine shaped: callers bind a vertex
/// array, program and texture and then issue `draw_triangles`. Implementations
/// resolve the bound state at draw time.
///
/// Every method must be called from the thread that owns the GPU context.
pub trait Backend {
    fn create_vertex_array(&mut self) -> VertexArrayId;
    fn bind_vertex_array(&mut self, id: VertexArrayId);
    fn delete_vertex_array(&mut self, id: VertexArrayId);

    /// Allocates a buffer sized to `contents` and uploads it.
    fn create_buffer(&mut self, contents: &[f32]) -> BufferId;
    /// Overwrites `contents.len()` floats starting at float `offset`.
    fn write_buffer(&mut self, id: BufferId, offset: usize, contents: &[f32]);
    fn delete_buffer(&mut self, id: BufferId);
    /// Binds `buffer` to attribute `location` of the bound vertex array.
    fn vertex_attribute(&mut self, location: u32, buffer: BufferId, dimension: u32);

    /// Compiles both stages. Entry points are `vs_main` and `fs_main`.
    fn compile_program(&mut self, vertex: &ShaderSource, fragment: &ShaderSource)
        -> Result<ProgramId>;
    fn use_program(&mut self, id: ProgramId);
    /// Writes one 16-byte uniform slot of `program`.
    fn write_uniform(&mut self, program: ProgramId, slot: u32, value: [f32; 4]);

    /// Uploads tightly packed RGBA8 pixels, row 0 at the top.
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId;
    fn bind_texture(&mut self, id: TextureId);

    /// Starts a frame and clears it.
    fn clear(&mut self, color: ColorRgba);
    /// Draws `vertex_count` vertices of the bound vertex array as a triangle list.
    fn draw_triangles(&mut self, vertex_count: u32);
}
