//! Keyboard and mouse snapshot.
//!
//! The public API does not expose winit types. The desktop window translates
//! platform events into `InputEvent`s and folds them into an `InputState`
//! once per `poll_input`.

mod state;
mod types;

pub(crate) mod platform;

pub use state::InputState;
pub use types::{ButtonState, InputEvent, Key, Modifiers, MouseButton};
