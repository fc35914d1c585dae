//! Translation of SDL2 events into engine input events.

use ge3d_core::input::{Action, InputEvent, InputState, Key, MouseButton};
use sdl2::{event::Event, keyboard::Keycode, mouse};

pub fn map_key(keycode: Keycode) -> Key {
    match keycode {
        Keycode::W => Key::W,
        Keycode::A => Key::A,
        Keycode::S => Key::S,
        Keycode::D => Key::D,
        Keycode::LShift => Key::LeftShift,
        Keycode::Escape => Key::Escape,
        _ => Key::Other,
    }
}

pub fn map_button(button: mouse::MouseButton) -> MouseButton {
    match button {
        mouse::MouseButton::Left => MouseButton::Left,
        mouse::MouseButton::Right => MouseButton::Right,
        mouse::MouseButton::Middle => MouseButton::Middle,
        _ => MouseButton::Other,
    }
}

/// Converts keyboard, mouse and wheel events. Everything else yields `None`.
///
/// With `relative` set (captured cursor) motion is accumulated onto the last known
/// cursor position instead of using the reported absolute one.
pub fn translate(event: &Event, state: &InputState, relative: bool) -> Option<InputEvent> {
    match *event {
        Event::KeyDown {
            keycode: Some(keycode),
            repeat,
            ..
        } => Some(InputEvent::Key {
            key: map_key(keycode),
            action: if repeat { Action::Repeat } else { Action::Press },
        }),
        Event::KeyUp {
            keycode: Some(keycode),
            ..
        } => Some(InputEvent::Key {
            key: map_key(keycode),
            action: Action::Release,
        }),
        Event::MouseMotion {
            x, y, xrel, yrel, ..
        } => Some(if relative {
            InputEvent::CursorMoved {
                x: state.cursor.x + xrel as f32,
                y: state.cursor.y + yrel as f32,
            }
        } else {
            InputEvent::CursorMoved {
                x: x as f32,
                y: y as f32,
            }
        }),
        Event::MouseButtonDown { mouse_btn, .. } => Some(InputEvent::MouseButton {
            button: map_button(mouse_btn),
            action: Action::Press,
        }),
        Event::MouseButtonUp { mouse_btn, .. } => Some(InputEvent::MouseButton {
            button: map_button(mouse_btn),
            action: Action::Release,
        }),
        Event::MouseWheel { x, y, .. } => Some(InputEvent::Scroll {
            x: x as f32,
            y: y as f32,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_are_recognised() {
        assert_eq!(map_key(Keycode::W), Key::W);
        assert_eq!(map_key(Keycode::LShift), Key::LeftShift);
        assert_eq!(map_key(Keycode::Escape), Key::Escape);
        assert_eq!(map_key(Keycode::Q), Key::Other);
    }

    #[test]
    fn mouse_buttons_are_recognised() {
        assert_eq!(map_button(mouse::MouseButton::Right), MouseButton::Right);
        assert_eq!(map_button(mouse::MouseButton::X1), MouseButton::Other);
    }

    #[test]
    fn quit_is_not_an_input_event() {
        let event = Event::Quit { timestamp: 0 };
        assert_eq!(translate(&event, &InputState::default(), false), None);
    }
}
