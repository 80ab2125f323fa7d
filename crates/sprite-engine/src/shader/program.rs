use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::device::{Backend, MAX_UNIFORM_SLOTS, ProgramId, ShaderSource};

use super::sprite;
use super::uniform::{Uniform, UniformValue};

/// A shader program: two stages, named vertex attributes and a uniform table.
///
/// Attribute locations and uniform slots are assigned in registration order.
/// Lookups of names that were never registered are contract violations and
/// panic.
#[derive(Debug, Default)]
pub struct Program {
    id: Option<ProgramId>,
    vertex: Option<ShaderSource>,
    fragment: Option<ShaderSource>,
    attributes: Vec<String>,
    uniforms: Vec<Uniform>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlinked program with both stages taken from the built-in sprite shader.
    pub fn sprite() -> Self {
        let source = ShaderSource::new(sprite::LABEL, sprite::SOURCE);
        Self {
            vertex: Some(source.clone()),
            fragment: Some(source),
            ..Self::default()
        }
    }

    pub fn load_vertex(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.vertex = Some(read_source(path.as_ref(), "vertex")?);
        Ok(())
    }

    pub fn load_fragment(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.fragment = Some(read_source(path.as_ref(), "fragment")?);
        Ok(())
    }

    pub fn set_vertex_source(&mut self, source: ShaderSource) {
        self.vertex = Some(source);
    }

    pub fn set_fragment_source(&mut self, source: ShaderSource) {
        self.fragment = Some(source);
    }

    /// Compiles both stages into a GPU program.
    pub fn link(&mut self, gpu: &mut dyn Backend) -> Result<()> {
        if self.id.is_some() {
            bail!("program is already linked");
        }
        let (Some(vertex), Some(fragment)) = (&self.vertex, &self.fragment) else {
            bail!("program needs both a vertex and a fragment stage before linking");
        };

        let id = gpu
            .compile_program(vertex, fragment)
            .with_context(|| format!("failed to link {} + {}", vertex.label, fragment.label))?;
        log::debug!(
            "linked program {} ({} + {})",
            id.raw(),
            vertex.label,
            fragment.label
        );
        self.id = Some(id);
        Ok(())
    }

    pub fn id(&self) -> Option<ProgramId> {
        self.id
    }

    fn linked_id(&self) -> ProgramId {
        match self.id {
            Some(id) => id,
            None => panic!("shader program used before link()"),
        }
    }

    /// Registers a vertex attribute and returns its location.
    pub fn add_attribute(&mut self, name: &str) -> u32 {
        assert!(
            !self.attributes.iter().any(|a| a == name),
            "attribute {name} registered twice"
        );
        self.attributes.push(name.to_owned());
        (self.attributes.len() - 1) as u32
    }

    pub fn attribute_location(&self, name: &str) -> u32 {
        match self.attributes.iter().position(|a| a == name) {
            Some(location) => location as u32,
            None => panic!("invalid attribute {name}"),
        }
    }

    pub fn use_program(&self, gpu: &mut dyn Backend) {
        gpu.use_program(self.linked_id());
    }

    /// Registers a uniform and pushes its initial value once.
    pub fn add_uniform(&mut self, gpu: &mut dyn Backend, name: &str, value: UniformValue) {
        let program = self.linked_id();
        assert!(
            self.find(name).is_none(),
            "uniform {name} registered twice"
        );
        let slot = self.uniforms.len() as u32;
        assert!(
            slot < MAX_UNIFORM_SLOTS,
            "program has no free uniform slot for {name}"
        );

        let mut uniform = Uniform::new(name, slot, value);
        uniform.apply(gpu, program);
        self.uniforms.push(uniform);
    }

    /// Stages a new value; it is pushed by the next `apply_uniforms`.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        match self.uniforms.iter_mut().find(|u| u.name() == name) {
            Some(uniform) => uniform.stage(value),
            None => panic!("attempting to set non-existent uniform {name}"),
        }
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.find(name).map(Uniform::value)
    }

    pub fn uniforms(&self) -> &[Uniform] {
        &self.uniforms
    }

    fn find(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.iter().find(|u| u.name() == name)
    }

    /// Pushes every staged uniform. Called right before a draw.
    pub fn apply_uniforms(&mut self, gpu: &mut dyn Backend) {
        let program = self.linked_id();
        for uniform in &mut self.uniforms {
            uniform.apply(gpu, program);
        }
    }

    /// Marks every uniform for re-upload on the next `apply_uniforms`.
    pub fn refresh_uniforms(&mut self) {
        for uniform in &mut self.uniforms {
            uniform.force_pending();
        }
    }
}

fn read_source(path: &Path, stage: &str) -> Result<ShaderSource> {
    let code = std::fs::read_to_string(path)
        .with_context(|| format!("unable to read {stage} shader {}", path.display()))?;
    Ok(ShaderSource::new(path.display().to_string(), code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{Call, RecordingBackend};

    fn linked(gpu: &mut RecordingBackend) -> Program {
        let mut program = Program::sprite();
        program.link(gpu).unwrap();
        program
    }

    #[test]
    fn missing_shader_file_is_an_error() {
        let mut program = Program::new();
        let err = program
            .load_vertex("/definitely/not/here.wgsl")
            .unwrap_err();
        assert!(format!("{err:#}").contains("unable to read vertex shader"));
    }

    #[test]
    fn link_without_stages_fails() {
        let mut gpu = RecordingBackend::new();
        assert!(Program::new().link(&mut gpu).is_err());
    }

    #[test]
    fn builtin_stages_share_one_module() {
        let mut gpu = RecordingBackend::new();
        linked(&mut gpu);
        assert_eq!(gpu.compiled, vec![sprite::LABEL.to_string()]);
    }

    #[test]
    fn attributes_get_sequential_locations() {
        let mut program = Program::sprite();
        assert_eq!(program.add_attribute(sprite::ATTR_VERT), 0);
        assert_eq!(program.add_attribute(sprite::ATTR_TEXCOORD), 1);
        assert_eq!(program.attribute_location(sprite::ATTR_TEXCOORD), 1);
    }

    #[test]
    #[should_panic(expected = "invalid attribute")]
    fn unknown_attribute_panics() {
        Program::sprite().attribute_location("rotgroup");
    }

    #[test]
    fn add_uniform_pushes_once() {
        let mut gpu = RecordingBackend::new();
        let mut program = linked(&mut gpu);
        program.add_uniform(&mut gpu, "zoom", UniformValue::Float(1.0));
        assert_eq!(gpu.uniform_writes(0), vec![[1.0, 0.0, 0.0, 0.0]]);

        program.apply_uniforms(&mut gpu);
        assert_eq!(gpu.uniform_writes(0).len(), 1);
    }

    #[test]
    fn staged_values_are_applied_lazily() {
        let mut gpu = RecordingBackend::new();
        let mut program = linked(&mut gpu);
        program.add_uniform(&mut gpu, "trans", UniformValue::Vec2([0.0, 0.0]));
        gpu.clear_calls();

        program.set_uniform("trans", UniformValue::Vec2([1.0, 0.0]));
        program.set_uniform("trans", UniformValue::Vec2([5.0, 6.0]));
        assert!(gpu.calls.is_empty());

        program.apply_uniforms(&mut gpu);
        assert_eq!(gpu.uniform_writes(0), vec![[5.0, 6.0, 0.0, 0.0]]);
    }

    #[test]
    fn refresh_reuploads_everything() {
        let mut gpu = RecordingBackend::new();
        let mut program = linked(&mut gpu);
        program.add_uniform(&mut gpu, "a", UniformValue::Float(1.0));
        program.add_uniform(&mut gpu, "b", UniformValue::Float(2.0));
        gpu.clear_calls();

        program.refresh_uniforms();
        program.apply_uniforms(&mut gpu);
        let writes = gpu
            .calls
            .iter()
            .filter(|c| matches!(c, Call::WriteUniform { .. }))
            .count();
        assert_eq!(writes, 2);
    }

    #[test]
    #[should_panic(expected = "non-existent uniform")]
    fn setting_unknown_uniform_panics() {
        let mut gpu = RecordingBackend::new();
        let mut program = linked(&mut gpu);
        program.set_uniform("missing", UniformValue::Float(1.0));
    }

    #[test]
    #[should_panic(expected = "before link")]
    fn uniform_before_link_panics() {
        let mut gpu = RecordingBackend::new();
        Program::sprite().add_uniform(&mut gpu, "zoom", UniformValue::Float(1.0));
    }
}
