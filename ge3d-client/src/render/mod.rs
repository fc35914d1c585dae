//! Rendering building blocks: meshes, instanced meshes, the skybox, light uniforms and
//! the built-in shader programs.

use std::sync::Arc;

use crate::{abs::ShaderProgram, error::Result};

pub mod instancing;
pub mod lighting;
pub mod mesh;
pub mod skybox;

/// Name of the uniform block holding the view and projection matrices.
pub const MATRICES_BLOCK: &str = "Matrices";
/// Size of the [`MATRICES_BLOCK`]: view then projection, both `mat4`.
pub const MATRICES_BLOCK_SIZE: usize = 2 * std::mem::size_of::<glam::Mat4>();

/// The shader programs the game renders with.
pub struct Shaders {
    /// Lit, textured meshes drawn one object at a time.
    pub default: ShaderProgram,
    /// Lit, textured meshes with per-instance matrices.
    pub instancing: ShaderProgram,
    pub skybox: ShaderProgram,
}

impl Shaders {
    pub fn new(gl: &Arc<glow::Context>) -> Result<Self> {
        let default = crate::shader_program!(default, gl, "..")?;
        let instancing = ShaderProgram::from_sources(
            gl,
            include_str!("shaders/instancing/vert.glsl"),
            include_str!("shaders/default/frag.glsl"),
            None,
        )?;
        let skybox = crate::shader_program!(skybox, gl, "..")?;
        Ok(Self {
            default,
            instancing,
            skybox,
        })
    }

    /// Programs that read the [`MATRICES_BLOCK`].
    pub fn all(&self) -> [&ShaderProgram; 3] {
        [&self.default, &self.instancing, &self.skybox]
    }

    /// Programs that take lighting uniforms.
    pub fn lit(&self) -> [&ShaderProgram; 2] {
        [&self.default, &self.instancing]
    }
}
