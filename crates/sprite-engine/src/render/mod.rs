//! Render objects and the GPU resources they own.
//!
//! Convention:
//! - CPU geometry is in pixels (bottom-left origin, +Y up).
//! - Texture rectangles are in texture pixels (top-left origin).
//! - The sprite vertex shader converts to NDC using the `dim` uniform.
//!
//! Everything that touches a `Backend` must run on the rendering thread.
//! `SharedVec2` and `GateRelease` are the only types here meant to cross
//! threads.

mod buffer;
mod gate;
mod object;
mod texture;
mod transform;
mod vao;

pub use buffer::GpuBuffer;
pub use gate::{GateRelease, RenderGate, render_gate};
pub use object::{QUAD_VERTICES, RenderObject};
pub use texture::{Texture, TextureSource};
pub use transform::{SharedVec2, Transform};
pub use vao::Vao;

pub(crate) use object::ModeCell;
