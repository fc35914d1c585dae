//! Windowing-library independent input events.
//!
//! The client translates native events into [`InputEvent`]s and keeps an [`InputState`]
//! up to date before handing both to the camera and the world objects.

use fxhash::FxHashSet;
use glam::Vec2;

/// Keys the engine reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    LeftShift,
    Escape,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Press,
    Release,
    Repeat,
}

/// A single input event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// The framebuffer was resized to the given size in pixels.
    Resize { width: u32, height: u32 },
    Key { key: Key, action: Action },
    /// The cursor moved to an absolute window position.
    CursorMoved { x: f32, y: f32 },
    MouseButton { button: MouseButton, action: Action },
    Scroll { x: f32, y: f32 },
}

/// The current state of the keyboard and mouse.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub keys_down: FxHashSet<Key>,
    pub buttons_down: FxHashSet<MouseButton>,
    pub cursor: Vec2,
}

impl InputState {
    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Folds an event into the state. Repeats don't change anything.
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Key {
                key,
                action: Action::Press,
            } => {
                self.keys_down.insert(key);
            }
            InputEvent::Key {
                key,
                action: Action::Release,
            } => {
                self.keys_down.remove(&key);
            }
            InputEvent::MouseButton {
                button,
                action: Action::Press,
            } => {
                self.buttons_down.insert(button);
            }
            InputEvent::MouseButton {
                button,
                action: Action::Release,
            } => {
                self.buttons_down.remove(&button);
            }
            InputEvent::CursorMoved { x, y } => self.cursor = Vec2::new(x, y),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_tracks_presses_and_releases() {
        let mut state = InputState::default();
        state.apply(&InputEvent::Key {
            key: Key::W,
            action: Action::Press,
        });
        state.apply(&InputEvent::MouseButton {
            button: MouseButton::Right,
            action: Action::Press,
        });
        assert!(state.is_key_down(Key::W));
        assert!(state.is_button_down(MouseButton::Right));

        state.apply(&InputEvent::Key {
            key: Key::W,
            action: Action::Repeat,
        });
        assert!(state.is_key_down(Key::W));

        state.apply(&InputEvent::Key {
            key: Key::W,
            action: Action::Release,
        });
        state.apply(&InputEvent::CursorMoved { x: 4.0, y: 2.0 });
        assert!(!state.is_key_down(Key::W));
        assert_eq!(state.cursor, Vec2::new(4.0, 2.0));
    }
}
