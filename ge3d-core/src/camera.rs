//! Perspective camera driven by input events.
//!
//! The camera composes a [`Model`] with projection parameters and a linear velocity. How
//! input maps onto that state is decided by its [`Controls`] policy:
//!
//! - [`Controls::FirstPerson`]: WASD moves, the cursor always looks around and the scroll
//!   wheel zooms.
//! - [`Controls::Navigator`]: WASD moves, the cursor only looks around while a mouse
//!   button is held, the right button flies forward (backward with left shift) and the
//!   scroll wheel changes the flying speed.
//!
//! Velocity lives in the camera's own frame: `x` is along the look axis and `y` along the
//! side axis (to the left when the normal points up).

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::{
    input::{Action, InputEvent, InputState, Key, MouseButton},
    model::Model,
};

/// Lower bound for the field of view, in degrees.
pub const MIN_FOV: f32 = 1.0;

/// Input policy of a [`Camera`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controls {
    FirstPerson,
    #[default]
    Navigator,
}

#[derive(Clone, Debug)]
pub struct Camera {
    model: Model,
    controls: Controls,
    max_fov: f32,
    current_fov: f32,
    aspect_ratio: f32,
    near: f32,
    far: f32,
    velocity: Vec3,
    linear_speed: f32,
    cursor_sensitivity: f32,
    scroll_sensitivity: f32,
    horizontal_rotation_axis: Vec3,
    last_cursor: Option<Vec2>,
}

impl Camera {
    /// Creates a camera at the origin looking along +X with +Z up.
    /// Field of view values are in degrees.
    pub fn new(controls: Controls, max_fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            model: Model::default(),
            controls,
            max_fov,
            current_fov: max_fov.max(MIN_FOV),
            aspect_ratio,
            near,
            far,
            velocity: Vec3::ZERO,
            linear_speed: 10.0,
            cursor_sensitivity: 0.1,
            scroll_sensitivity: 2.0,
            horizontal_rotation_axis: Vec3::Z,
            last_cursor: None,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn set_controls(&mut self, controls: Controls) {
        self.controls = controls;
        self.velocity = Vec3::ZERO;
        self.last_cursor = None;
    }

    pub fn max_fov(&self) -> f32 {
        self.max_fov
    }

    /// Sets the upper fov bound. The current fov is clamped again.
    pub fn set_max_fov(&mut self, fov: f32) {
        if !fov.is_finite() {
            log::warn!("Ignoring non-finite max field of view {fov}");
            return;
        }
        self.max_fov = fov;
        self.set_current_fov(self.current_fov);
    }

    pub fn current_fov(&self) -> f32 {
        self.current_fov
    }

    /// Sets the field of view, clamped to `[MIN_FOV, max_fov]`. A max below
    /// [`MIN_FOV`] counts as [`MIN_FOV`]. Non-finite values are ignored.
    pub fn set_current_fov(&mut self, fov: f32) {
        if !fov.is_finite() {
            log::warn!("Ignoring non-finite field of view {fov}");
            return;
        }
        self.current_fov = fov.clamp(MIN_FOV, self.max_fov.max(MIN_FOV));
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn linear_speed(&self) -> f32 {
        self.linear_speed
    }

    /// Sets the movement speed in units per second. Negative values become zero.
    pub fn set_linear_speed(&mut self, speed: f32) {
        self.linear_speed = speed.max(0.0);
    }

    pub fn cursor_sensitivity(&self) -> f32 {
        self.cursor_sensitivity
    }

    /// Degrees of rotation per pixel of cursor movement.
    pub fn set_cursor_sensitivity(&mut self, sensitivity: f32) {
        self.cursor_sensitivity = sensitivity;
    }

    pub fn scroll_sensitivity(&self) -> f32 {
        self.scroll_sensitivity
    }

    pub fn set_scroll_sensitivity(&mut self, sensitivity: f32) {
        self.scroll_sensitivity = sensitivity;
    }

    pub fn horizontal_rotation_axis(&self) -> Vec3 {
        self.horizontal_rotation_axis
    }

    /// Sets the world axis used for yaw.
    pub fn set_horizontal_rotation_axis(&mut self, axis: Vec3) {
        self.horizontal_rotation_axis = axis;
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.current_fov.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.model.view_matrix()
    }

    /// Integrates the velocity over `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.velocity.length_squared() > 0.0 {
            self.model.translate_in_local_frame(self.velocity * dt);
        }
    }

    /// Applies an input event according to the active controls.
    pub fn handle_input(&mut self, event: &InputEvent, state: &InputState) {
        match *event {
            InputEvent::Key { .. } => self.update_velocity_from_keys(state),
            InputEvent::CursorMoved { x, y } => self.cursor_moved(Vec2::new(x, y), state),
            InputEvent::MouseButton { button, action } => {
                if self.controls == Controls::Navigator {
                    self.navigator_button(button, action, state);
                }
            }
            InputEvent::Scroll { y, .. } => match self.controls {
                Controls::FirstPerson => {
                    self.set_current_fov(self.current_fov - self.scroll_sensitivity * y)
                }
                Controls::Navigator => {
                    self.set_linear_speed(self.linear_speed + self.scroll_sensitivity * y)
                }
            },
            InputEvent::Resize { width, height } => {
                if height > 0 {
                    self.set_aspect_ratio(width as f32 / height as f32);
                }
            }
        }
    }

    fn update_velocity_from_keys(&mut self, state: &InputState) {
        let forward = state.is_key_down(Key::W);
        let backward = state.is_key_down(Key::S);
        let left = state.is_key_down(Key::A);
        let right = state.is_key_down(Key::D);

        // Fixed check order, last write wins when both keys of a pair are held.
        if forward {
            self.velocity.x = self.linear_speed;
        }
        if backward {
            self.velocity.x = -self.linear_speed;
        }
        if left {
            self.velocity.y = self.linear_speed;
        }
        if right {
            self.velocity.y = -self.linear_speed;
        }
        let flying =
            self.controls == Controls::Navigator && state.is_button_down(MouseButton::Right);
        if !forward && !backward && !flying {
            self.velocity.x = 0.0;
        }
        if !left && !right {
            self.velocity.y = 0.0;
        }
    }

    fn cursor_moved(&mut self, cursor: Vec2, state: &InputState) {
        let Some(last) = self.last_cursor.replace(cursor) else {
            return;
        };

        let looking = match self.controls {
            Controls::FirstPerson => true,
            Controls::Navigator => {
                state.is_button_down(MouseButton::Left) || state.is_button_down(MouseButton::Right)
            }
        };
        if !looking {
            return;
        }

        let offset = cursor - last;
        let yaw = (-offset.x * self.cursor_sensitivity).to_radians();
        let pitch = (offset.y * self.cursor_sensitivity).to_radians();
        let side = self.model.side_direction();
        self.model
            .rotate(pitch, side)
            .rotate(yaw, self.horizontal_rotation_axis);
    }

    fn navigator_button(&mut self, button: MouseButton, action: Action, state: &InputState) {
        if button != MouseButton::Right {
            return;
        }
        match action {
            Action::Press => {
                self.velocity.x = if state.is_key_down(Key::LeftShift) {
                    -self.linear_speed
                } else {
                    self.linear_speed
                };
            }
            Action::Release => self.velocity.x = 0.0,
            Action::Repeat => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(controls: Controls) -> Camera {
        Camera::new(controls, 45.0, 16.0 / 9.0, 0.1, 1000.0)
    }

    fn press(state: &mut InputState, camera: &mut Camera, key: Key) {
        let event = InputEvent::Key {
            key,
            action: Action::Press,
        };
        state.apply(&event);
        camera.handle_input(&event, state);
    }

    fn release(state: &mut InputState, camera: &mut Camera, key: Key) {
        let event = InputEvent::Key {
            key,
            action: Action::Release,
        };
        state.apply(&event);
        camera.handle_input(&event, state);
    }

    fn move_cursor(state: &mut InputState, camera: &mut Camera, x: f32, y: f32) {
        let event = InputEvent::CursorMoved { x, y };
        state.apply(&event);
        camera.handle_input(&event, state);
    }

    #[test]
    fn defaults() {
        let camera = camera(Controls::FirstPerson);
        assert_eq!(camera.current_fov(), 45.0);
        assert_eq!(camera.linear_speed(), 10.0);
        assert_eq!(camera.cursor_sensitivity(), 0.1);
        assert_eq!(camera.scroll_sensitivity(), 2.0);
        assert_eq!(camera.horizontal_rotation_axis(), Vec3::Z);
        assert_eq!(camera.model().look_at_direction(), Vec3::X);
        assert_eq!(camera.model().normal_direction(), Vec3::Z);
    }

    #[test]
    fn fov_is_clamped_and_idempotent() {
        let mut camera = camera(Controls::FirstPerson);
        for fov in [-10.0, 0.0, 0.5, 1.0, 30.0, 45.0, 90.0] {
            camera.set_current_fov(fov);
            let first = camera.current_fov();
            assert!((MIN_FOV..=45.0).contains(&first));
            camera.set_current_fov(fov);
            assert_eq!(camera.current_fov(), first);
        }

        camera.set_current_fov(30.0);
        camera.set_current_fov(f32::NAN);
        assert_eq!(camera.current_fov(), 30.0);
        camera.set_current_fov(f32::INFINITY);
        assert_eq!(camera.current_fov(), 30.0);

        camera.set_max_fov(0.5);
        assert_eq!(camera.current_fov(), MIN_FOV);
        camera.set_current_fov(20.0);
        assert_eq!(camera.current_fov(), MIN_FOV);

        camera.set_max_fov(f32::NAN);
        assert_eq!(camera.max_fov(), 0.5);
    }

    #[test]
    fn scroll_zooms_first_person_fov() {
        let mut camera = camera(Controls::FirstPerson);
        let state = InputState::default();

        camera.handle_input(&InputEvent::Scroll { x: 0.0, y: 10.0 }, &state);
        assert_eq!(camera.current_fov(), 25.0);

        camera.handle_input(&InputEvent::Scroll { x: 0.0, y: 15.0 }, &state);
        assert_eq!(camera.current_fov(), MIN_FOV);

        camera.handle_input(&InputEvent::Scroll { x: 0.0, y: -100.0 }, &state);
        assert_eq!(camera.current_fov(), 45.0);
    }

    #[test]
    fn scroll_changes_navigator_speed() {
        let mut camera = camera(Controls::Navigator);
        let state = InputState::default();

        camera.handle_input(&InputEvent::Scroll { x: 0.0, y: 1.5 }, &state);
        assert_eq!(camera.linear_speed(), 13.0);
        camera.handle_input(&InputEvent::Scroll { x: 0.0, y: -20.0 }, &state);
        assert_eq!(camera.linear_speed(), 0.0);
        assert_eq!(camera.current_fov(), 45.0);
    }

    #[test]
    fn keys_set_and_clear_velocity() {
        let mut camera = camera(Controls::FirstPerson);
        let mut state = InputState::default();

        press(&mut state, &mut camera, Key::W);
        assert_eq!(camera.velocity(), Vec3::new(10.0, 0.0, 0.0));

        press(&mut state, &mut camera, Key::D);
        assert_eq!(camera.velocity(), Vec3::new(10.0, -10.0, 0.0));

        release(&mut state, &mut camera, Key::W);
        release(&mut state, &mut camera, Key::D);
        assert_eq!(camera.velocity(), Vec3::ZERO);
    }

    #[test]
    fn opposing_keys_resolve_to_the_later_check() {
        let mut camera = camera(Controls::FirstPerson);
        let mut state = InputState::default();

        press(&mut state, &mut camera, Key::S);
        press(&mut state, &mut camera, Key::W);
        assert_eq!(camera.velocity().x, -10.0);

        press(&mut state, &mut camera, Key::D);
        press(&mut state, &mut camera, Key::A);
        assert_eq!(camera.velocity().y, -10.0);

        release(&mut state, &mut camera, Key::S);
        assert_eq!(camera.velocity().x, 10.0);
    }

    #[test]
    fn update_moves_along_look_direction() {
        let mut camera = camera(Controls::FirstPerson);
        let mut state = InputState::default();
        camera
            .model_mut()
            .rotate(std::f32::consts::FRAC_PI_2, Vec3::Z);

        camera.update(1.0);
        assert_eq!(camera.model().position(), Vec3::ZERO);

        press(&mut state, &mut camera, Key::W);
        camera.update(0.5);
        assert!(
            camera
                .model()
                .position()
                .abs_diff_eq(Vec3::new(0.0, 5.0, 0.0), 1e-5)
        );
    }

    #[test]
    fn first_cursor_event_only_sets_baseline() {
        let mut camera = camera(Controls::FirstPerson);
        let mut state = InputState::default();
        let before = camera.model().orientation();

        move_cursor(&mut state, &mut camera, 400.0, 300.0);
        assert_eq!(camera.model().orientation(), before);

        move_cursor(&mut state, &mut camera, 300.0, 300.0);
        // 100 px left at 0.1 deg/px yaws 10 degrees to the left.
        let expected = Vec3::new(10f32.to_radians().cos(), 10f32.to_radians().sin(), 0.0);
        assert!(camera.model().look_at_direction().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn yaw_does_not_roll() {
        let mut camera = camera(Controls::FirstPerson);
        let mut state = InputState::default();

        move_cursor(&mut state, &mut camera, 0.0, 0.0);
        move_cursor(&mut state, &mut camera, 0.0, -200.0);
        move_cursor(&mut state, &mut camera, 350.0, -200.0);

        // The side axis stays horizontal as long as yaw is around the world up axis.
        assert!(camera.model().side_direction().z.abs() < 1e-5);
    }

    #[test]
    fn navigator_looks_only_while_a_button_is_held() {
        let mut camera = camera(Controls::Navigator);
        let mut state = InputState::default();
        let before = camera.model().orientation();

        move_cursor(&mut state, &mut camera, 0.0, 0.0);
        move_cursor(&mut state, &mut camera, 50.0, 20.0);
        assert_eq!(camera.model().orientation(), before);

        let event = InputEvent::MouseButton {
            button: MouseButton::Left,
            action: Action::Press,
        };
        state.apply(&event);
        camera.handle_input(&event, &state);
        move_cursor(&mut state, &mut camera, 80.0, 20.0);
        assert_ne!(camera.model().orientation(), before);
        assert_eq!(camera.velocity(), Vec3::ZERO);
    }

    #[test]
    fn navigator_right_button_flies() {
        let mut camera = camera(Controls::Navigator);
        let mut state = InputState::default();
        let right_press = InputEvent::MouseButton {
            button: MouseButton::Right,
            action: Action::Press,
        };
        let right_release = InputEvent::MouseButton {
            button: MouseButton::Right,
            action: Action::Release,
        };

        state.apply(&right_press);
        camera.handle_input(&right_press, &state);
        assert_eq!(camera.velocity().x, 10.0);

        state.apply(&right_release);
        camera.handle_input(&right_release, &state);
        assert_eq!(camera.velocity().x, 0.0);

        press(&mut state, &mut camera, Key::LeftShift);
        state.apply(&right_press);
        camera.handle_input(&right_press, &state);
        assert_eq!(camera.velocity().x, -10.0);

        // Strafing while flying keeps the flight speed.
        press(&mut state, &mut camera, Key::A);
        assert_eq!(camera.velocity(), Vec3::new(-10.0, 10.0, 0.0));
    }

    #[test]
    fn resize_updates_aspect_ratio() {
        let mut camera = camera(Controls::Navigator);
        let state = InputState::default();
        camera.handle_input(
            &InputEvent::Resize {
                width: 800,
                height: 400,
            },
            &state,
        );
        assert_eq!(camera.aspect_ratio(), 2.0);
        camera.handle_input(
            &InputEvent::Resize {
                width: 800,
                height: 0,
            },
            &state,
        );
        assert_eq!(camera.aspect_ratio(), 2.0);
    }
}
