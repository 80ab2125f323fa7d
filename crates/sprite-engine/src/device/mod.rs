//! GPU access for the rendering thread.
//!
//! Everything GPU-bound goes through the GL-shaped [`Backend`] trait.
//! [`WgpuBackend`] implements it on a window's swap chain.

mod backend;
mod gpu;
mod init;
mod surface;
mod wgpu_backend;

#[cfg(test)]
pub(crate) mod recording;

pub use backend::{
    Backend, BufferId, MAX_UNIFORM_SLOTS, ProgramId, ShaderSource, TextureId, VertexArrayId,
};
pub use gpu::Gpu;
pub use init::GpuInit;
pub use wgpu_backend::WgpuBackend;
