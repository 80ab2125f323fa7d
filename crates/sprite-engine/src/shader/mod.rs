//! Shader programs and their uniforms.

mod program;
mod uniform;

pub use program::Program;
pub use uniform::{Uniform, UniformValue};

/// Names used by the built-in sprite program.
///
/// Uniforms must be registered in the order listed in `UNIFORMS`; that order
/// is the layout of the uniform block in `sprite.wgsl`.
pub mod sprite {
    pub const ATTR_VERT: &str = "vert";
    pub const ATTR_TEXCOORD: &str = "verttexcoord";

    pub const ROT: &str = "rot";
    pub const ROT_CENTER: &str = "rotcenter";
    pub const TRANS: &str = "trans";
    pub const DIM: &str = "dim";
    pub const CAM: &str = "cam";
    pub const ZOOM: &str = "zoom";

    pub const UNIFORMS: [&str; 6] = [ROT, ROT_CENTER, TRANS, DIM, CAM, ZOOM];

    pub(crate) const LABEL: &str = "builtin:sprite.wgsl";
    pub(crate) const SOURCE: &str = include_str!("sprite.wgsl");
}
