//! Objects that live in the game world.
//!
//! Anything in the world list implements [`WorldObject`]. The game updates every object
//! once per frame, forwards input events to it after the camera has seen them and asks
//! it to draw itself.

use ge3d_core::input::{InputEvent, InputState};

use crate::render::Shaders;

pub mod game_object;
pub mod instancing;
pub mod primitives;

pub use game_object::GameObject;
pub use instancing::InstancingGameObjects;
pub use primitives::{Plane, quad};

/// The WorldObject trait defines the common interface for everything in the world list.
pub trait WorldObject {
    /// Advances time dependent state by `dt` seconds.
    fn update(&mut self, _dt: f32) {}

    /// Reacts to an input event.
    fn handle_input(&mut self, _event: &InputEvent, _state: &InputState) {}

    /// Draws the object. Per-frame uniforms are already set on the lit programs.
    fn render(&mut self, shaders: &Shaders);
}
