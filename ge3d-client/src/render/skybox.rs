//! Cubemap skybox drawn behind everything else.

use std::{path::Path, sync::Arc};

use glow::HasContext;

use crate::{
    abs::{CubeMap, ShaderProgram},
    error::{EngineError, Result},
};

#[rustfmt::skip]
const CUBE_VERTICES: [f32; 108] = [
    -1.0,  1.0, -1.0,  -1.0, -1.0, -1.0,   1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,   1.0,  1.0, -1.0,  -1.0,  1.0, -1.0,

    -1.0, -1.0,  1.0,  -1.0, -1.0, -1.0,  -1.0,  1.0, -1.0,
    -1.0,  1.0, -1.0,  -1.0,  1.0,  1.0,  -1.0, -1.0,  1.0,

     1.0, -1.0, -1.0,   1.0, -1.0,  1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,   1.0,  1.0, -1.0,   1.0, -1.0, -1.0,

    -1.0, -1.0,  1.0,  -1.0,  1.0,  1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,   1.0, -1.0,  1.0,  -1.0, -1.0,  1.0,

    -1.0,  1.0, -1.0,   1.0,  1.0, -1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,  -1.0,  1.0,  1.0,  -1.0,  1.0, -1.0,

    -1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,   1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,   1.0, -1.0,  1.0,
];

pub struct Skybox {
    gl: Arc<glow::Context>,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    cube_map: CubeMap,
}

impl Skybox {
    /// Loads the six face images from `directory`.
    pub fn new(gl: &Arc<glow::Context>, directory: &Path) -> Result<Self> {
        let cube_map = CubeMap::from_directory(gl, directory)?;
        unsafe {
            let vao = gl.create_vertex_array().map_err(EngineError::GlLoad)?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(e) => {
                    gl.delete_vertex_array(vao);
                    return Err(EngineError::GlLoad(e));
                }
            };

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&CUBE_VERTICES),
                glow::STATIC_DRAW,
            );
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(
                0,
                3,
                glow::FLOAT,
                false,
                3 * std::mem::size_of::<f32>() as i32,
                0,
            );
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            log::info!("Loaded skybox from {}", directory.display());
            Ok(Self {
                gl: Arc::clone(gl),
                vao,
                vbo,
                cube_map,
            })
        }
    }

    /// Draws the cube with the cubemap on unit 0. The caller sets up depth testing and
    /// the translation-free view matrix.
    pub fn render(&self, shader: &ShaderProgram) {
        shader.set_uniform("skybox", 0i32);
        self.cube_map.bind(0);
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl
                .draw_arrays(glow::TRIANGLES, 0, (CUBE_VERTICES.len() / 3) as i32);
            self.gl.bind_vertex_array(None);
        }
    }
}

impl Drop for Skybox {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_vertex_array(self.vao);
        }
    }
}
