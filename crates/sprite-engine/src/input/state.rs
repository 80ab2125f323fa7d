use std::collections::HashSet;

use crate::coords::Vec2;

use super::types::{ButtonState, InputEvent, Key, Modifiers, MouseButton};

/// Input snapshot of one window.
///
/// Holds what is down right now plus the transitions seen during the last
/// `poll_input`.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,

    /// Last cursor position (pixels, bottom-left origin). `None` once the
    /// cursor leaves the window.
    pub cursor: Option<Vec2>,

    keys_down: HashSet<Key>,
    buttons_down: HashSet<MouseButton>,

    keys_pressed: HashSet<Key>,
    keys_released: HashSet<Key>,
}

impl InputState {
    /// Drops the previous poll's transitions.
    pub fn begin_poll(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::ModifiersChanged(m) => self.modifiers = m,

            InputEvent::Focused(focused) => {
                self.focused = focused;
                if !focused {
                    // Releases may arrive while unfocused; avoid stuck keys.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::CursorMoved { x, y } => self.cursor = Some(Vec2::new(x, y)),
            InputEvent::CursorLeft => self.cursor = None,

            InputEvent::Key { key, state } => match state {
                ButtonState::Pressed => {
                    if self.keys_down.insert(key) {
                        self.keys_pressed.insert(key);
                    }
                }
                ButtonState::Released => {
                    if self.keys_down.remove(&key) {
                        self.keys_released.insert(key);
                    }
                }
            },

            InputEvent::MouseButton { button, state } => match state {
                ButtonState::Pressed => {
                    self.buttons_down.insert(button);
                }
                ButtonState::Released => {
                    self.buttons_down.remove(&button);
                }
            },
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// True when every key of `keys` is held.
    pub fn key_combo(&self, keys: &[Key]) -> bool {
        !keys.is_empty() && keys.iter().all(|k| self.keys_down.contains(k))
    }

    /// Went down during the last poll.
    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Went up during the last poll.
    pub fn key_released(&self, key: Key) -> bool {
        self.keys_released.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}
