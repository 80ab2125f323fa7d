use crate::coords::Vec2;
use crate::device::{Backend, ProgramId};

/// Value of a shader uniform.
///
/// Every kind occupies one 16-byte slot of the program's uniform block.
/// `Mat2` is packed column-major into that slot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([f32; 4]),
}

impl UniformValue {
    pub const IDENTITY_MAT2: UniformValue = UniformValue::Mat2([1.0, 0.0, 0.0, 1.0]);

    /// Counter-clockwise rotation by `radians`.
    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        UniformValue::Mat2([cos, sin, -sin, cos])
    }

    pub fn same_kind(&self, other: &UniformValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Slot layout as written to the GPU.
    pub fn to_slot(self) -> [f32; 4] {
        match self {
            UniformValue::Float(v) => [v, 0.0, 0.0, 0.0],
            UniformValue::Vec2([x, y]) => [x, y, 0.0, 0.0],
            UniformValue::Vec3([x, y, z]) => [x, y, z, 0.0],
            UniformValue::Vec4(v) | UniformValue::Mat2(v) => v,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v.to_array())
    }
}

/// A named uniform with a staged value.
///
/// `stage` only records the value; `apply` pushes it once, immediately before
/// a draw, and only if it changed since the last push.
#[derive(Debug, Clone)]
pub struct Uniform {
    name: String,
    slot: u32,
    value: UniformValue,
    updated: bool,
}

impl Uniform {
    pub(crate) fn new(name: &str, slot: u32, value: UniformValue) -> Self {
        Self {
            name: name.to_owned(),
            slot,
            value,
            updated: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn value(&self) -> UniformValue {
        self.value
    }

    pub fn is_pending(&self) -> bool {
        self.updated
    }

    /// Panics when `value` is a different kind than the registered one.
    pub(crate) fn stage(&mut self, value: UniformValue) {
        assert!(
            self.value.same_kind(&value),
            "uniform {} registered as {:?} cannot take {:?}",
            self.name,
            self.value,
            value
        );
        if self.value != value {
            self.value = value;
            self.updated = true;
        }
    }

    pub(crate) fn force_pending(&mut self) {
        self.updated = true;
    }

    pub(crate) fn apply(&mut self, gpu: &mut dyn Backend, program: ProgramId) {
        if !self.updated {
            return;
        }
        self.updated = false;
        gpu.write_uniform(program, self.slot, self.value.to_slot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_packing_pads_with_zero() {
        assert_eq!(UniformValue::Float(2.0).to_slot(), [2.0, 0.0, 0.0, 0.0]);
        assert_eq!(UniformValue::Vec2([1.0, 2.0]).to_slot(), [1.0, 2.0, 0.0, 0.0]);
        assert_eq!(UniformValue::Vec3([1.0, 2.0, 3.0]).to_slot(), [1.0, 2.0, 3.0, 0.0]);
    }

    #[test]
    fn zero_rotation_is_identity() {
        assert_eq!(UniformValue::rotation(0.0), UniformValue::IDENTITY_MAT2);
    }

    #[test]
    fn staging_same_value_stays_clean() {
        let mut u = Uniform::new("zoom", 0, UniformValue::Float(1.0));
        u.updated = false;
        u.stage(UniformValue::Float(1.0));
        assert!(!u.is_pending());
        u.stage(UniformValue::Float(2.0));
        assert!(u.is_pending());
    }

    #[test]
    #[should_panic(expected = "cannot take")]
    fn staging_other_kind_panics() {
        let mut u = Uniform::new("zoom", 0, UniformValue::Float(1.0));
        u.stage(UniformValue::Vec2([1.0, 1.0]));
    }
}
