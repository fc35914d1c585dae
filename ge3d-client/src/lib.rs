//! OpenGL client of the ge3d engine.
//!
//! Builds on [`ge3d_core`] with an SDL2 window, glow based GPU wrappers, model and
//! texture loading, and the [`Game`](game::Game) loop tying it all together.

pub mod abs;
pub mod error;
pub mod game;
pub mod input;
pub mod logging;
pub mod render;
pub mod resources;
pub mod scene;

/// Builds a [`ShaderProgram`](abs::ShaderProgram) from `render/shaders/<name>/{vert,frag}.glsl`.
///
/// The path prefix leads from the invoking file to the crate's `src` directory.
#[macro_export]
macro_rules! shader_program {
    ($name:ident, $gl:expr, $path_prefix:literal) => {
        $crate::abs::ShaderProgram::from_sources(
            &$gl,
            include_str!(concat!(
                $path_prefix,
                "/render/shaders/",
                stringify!($name),
                "/vert.glsl"
            )),
            include_str!(concat!(
                $path_prefix,
                "/render/shaders/",
                stringify!($name),
                "/frag.glsl"
            )),
            None,
        )
    };
}
