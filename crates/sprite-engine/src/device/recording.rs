//! In-memory `Backend` used by unit tests.

use std::collections::HashMap;

use anyhow::{Result, bail};

use crate::coords::ColorRgba;

use super::backend::{Backend, BufferId, ProgramId, ShaderSource, TextureId, VertexArrayId};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateVertexArray(VertexArrayId),
    BindVertexArray(VertexArrayId),
    DeleteVertexArray(VertexArrayId),
    CreateBuffer { id: BufferId, len: usize },
    WriteBuffer { id: BufferId, offset: usize, len: usize },
    DeleteBuffer(BufferId),
    VertexAttribute { location: u32, buffer: BufferId, dimension: u32 },
    CompileProgram(ProgramId),
    UseProgram(ProgramId),
    WriteUniform { program: ProgramId, slot: u32, value: [f32; 4] },
    CreateTexture(TextureId),
    BindTexture(TextureId),
    Clear,
    Draw(u32),
    /// Non-GPU event recorded by test doubles (present, poll).
    Marker(&'static str),
}

/// Records every call and mirrors buffer contents so tests can inspect what
/// reached the "GPU".
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub calls: Vec<Call>,
    pub buffers: HashMap<BufferId, Vec<f32>>,
    pub compiled: Vec<String>,
    next_id: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn contents(&self, id: BufferId) -> &[f32] {
        self.buffers.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn draws(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    pub fn uniform_writes(&self, slot: u32) -> Vec<[f32; 4]> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::WriteUniform { slot: s, value, .. } if *s == slot => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn mark(&mut self, what: &'static str) {
        self.calls.push(Call::Marker(what));
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Backend for RecordingBackend {
    fn create_vertex_array(&mut self) -> VertexArrayId {
        let id = VertexArrayId(self.next_id());
        self.calls.push(Call::CreateVertexArray(id));
        id
    }

    fn bind_vertex_array(&mut self, id: VertexArrayId) {
        self.calls.push(Call::BindVertexArray(id));
    }

    fn delete_vertex_array(&mut self, id: VertexArrayId) {
        self.calls.push(Call::DeleteVertexArray(id));
    }

    fn create_buffer(&mut self, contents: &[f32]) -> BufferId {
        let id = BufferId(self.next_id());
        self.buffers.insert(id, contents.to_vec());
        self.calls.push(Call::CreateBuffer {
            id,
            len: contents.len(),
        });
        id
    }

    fn write_buffer(&mut self, id: BufferId, offset: usize, contents: &[f32]) {
        let stored = self
            .buffers
            .get_mut(&id)
            .unwrap_or_else(|| panic!("write to unknown buffer {id:?}"));
        stored[offset..offset + contents.len()].copy_from_slice(contents);
        self.calls.push(Call::WriteBuffer {
            id,
            offset,
            len: contents.len(),
        });
    }

    fn delete_buffer(&mut self, id: BufferId) {
        self.buffers.remove(&id);
        self.calls.push(Call::DeleteBuffer(id));
    }

    fn vertex_attribute(&mut self, location: u32, buffer: BufferId, dimension: u32) {
        self.calls.push(Call::VertexAttribute {
            location,
            buffer,
            dimension,
        });
    }

    fn compile_program(
        &mut self,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> Result<ProgramId> {
        if vertex.code.is_empty() || fragment.code.is_empty() {
            bail!("empty shader source");
        }
        for label in [&vertex.label, &fragment.label] {
            if !self.compiled.contains(label) {
                self.compiled.push(label.clone());
            }
        }
        let id = ProgramId(self.next_id());
        self.calls.push(Call::CompileProgram(id));
        Ok(id)
    }

    fn use_program(&mut self, id: ProgramId) {
        self.calls.push(Call::UseProgram(id));
    }

    fn write_uniform(&mut self, program: ProgramId, slot: u32, value: [f32; 4]) {
        self.calls.push(Call::WriteUniform {
            program,
            slot,
            value,
        });
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId {
        assert_eq!(rgba.len(), (width * height * 4) as usize);
        let id = TextureId(self.next_id());
        self.calls.push(Call::CreateTexture(id));
        id
    }

    fn bind_texture(&mut self, id: TextureId) {
        self.calls.push(Call::BindTexture(id));
    }

    fn clear(&mut self, _color: ColorRgba) {
        self.calls.push(Call::Clear);
    }

    fn draw_triangles(&mut self, vertex_count: u32) {
        self.calls.push(Call::Draw(vertex_count));
    }
}
