//! Sprite render-object engine.
//!
//! A single rendering thread owns the GPU through a [`renderer::Renderer`].
//! Other threads change GPU-bound state by submitting [`jobs::RenderJob`]s
//! or by writing [`render::SharedVec2`] cells the renderer reads each frame.

pub mod coords;
pub mod device;
pub mod input;
pub mod jobs;
pub mod logging;
pub mod render;
pub mod renderer;
pub mod shader;
pub mod text;
pub mod time;
pub mod window;
