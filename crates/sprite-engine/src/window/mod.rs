//! Windows the renderer draws into.
//!
//! `DesktopWindow` owns the winit event loop and window and wires them to the
//! wgpu backend. The loop is pumped from `poll_input`, so the render loop
//! stays an ordinary `while` on the thread that opened the window.

mod desktop;

#[cfg(test)]
pub(crate) mod headless;

pub use desktop::{DesktopWindow, WindowConfig};

use crate::coords::Viewport;
use crate::device::Backend;
use crate::input::InputState;

/// What the renderer needs from a window.
pub trait Window {
    /// Polled once per frame; the loop stops when this turns true.
    fn should_close(&self) -> bool;

    /// Processes pending platform events and refreshes the input snapshot.
    fn poll_input(&mut self);

    /// Presents the frame drawn since the last clear.
    fn swap_buffers(&mut self);

    /// Drawable size in physical pixels.
    fn size(&self) -> Viewport;

    fn input(&self) -> &InputState;

    fn gpu(&mut self) -> &mut dyn Backend;
}
