//! Scene ownership and the frame loop.

mod context;
mod frame_loop;
mod handle;
mod scene;

pub use context::RenderContext;
pub use frame_loop::{Renderer, RendererConfig};
pub use handle::{ObjectHandle, ObjectId};
pub use scene::{ObjectDesc, Scene};
