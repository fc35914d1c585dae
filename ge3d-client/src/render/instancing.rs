//! Instanced drawing of a [`Mesh`].
//!
//! An [`InstancingMesh`] is a second vertex array over a mesh's vertex and index buffers
//! that also streams one model matrix (locations 3-6) and one normal matrix (locations
//! 7-9) per instance out of an [`InstanceBuffers`] pair.

use std::sync::Arc;

use ge3d_core::instances::{MODEL_MATRIX_SIZE, NORMAL_MATRIX_SIZE};
use glam::{Vec3, Vec4};
use glow::HasContext;

use super::mesh::{Mesh, MeshVertex, Vertex};
use crate::{
    abs::{InstanceBuffers, ShaderProgram},
    error::{EngineError, Result},
};

const MODEL_MATRIX_LOCATION: u32 = 3;
const NORMAL_MATRIX_LOCATION: u32 = 7;

pub struct InstancingMesh {
    gl: Arc<glow::Context>,
    vao: glow::VertexArray,
    index_count: usize,
}

impl InstancingMesh {
    /// Builds the instanced vertex layout for `mesh` reading from `instances`.
    pub fn new(gl: &Arc<glow::Context>, mesh: &Mesh, instances: &InstanceBuffers) -> Result<Self> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(EngineError::GlLoad)?;
            gl.bind_vertex_array(Some(vao));

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(mesh.buffers().vbo));
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.buffers().ebo));
            MeshVertex::vertex_attribs(gl);

            // Model matrix, one vec4 column per location
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(instances.model));
            for column in 0..4 {
                let location = MODEL_MATRIX_LOCATION + column;
                gl.enable_vertex_attrib_array(location);
                gl.vertex_attrib_pointer_f32(
                    location,
                    4,
                    glow::FLOAT,
                    false,
                    MODEL_MATRIX_SIZE as i32,
                    (column as usize * std::mem::size_of::<Vec4>()) as i32,
                );
                gl.vertex_attrib_divisor(location, 1);
            }

            // Normal matrix, one vec3 column per location
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(instances.normal));
            for column in 0..3 {
                let location = NORMAL_MATRIX_LOCATION + column;
                gl.enable_vertex_attrib_array(location);
                gl.vertex_attrib_pointer_f32(
                    location,
                    3,
                    glow::FLOAT,
                    false,
                    NORMAL_MATRIX_SIZE as i32,
                    (column as usize * std::mem::size_of::<Vec3>()) as i32,
                );
                gl.vertex_attrib_divisor(location, 1);
            }

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            Ok(Self {
                gl: Arc::clone(gl),
                vao,
                index_count: mesh.index_count(),
            })
        }
    }

    /// Draws `instance_count` copies of `mesh`, whose textures are bound first.
    pub fn render(&self, mesh: &Mesh, shader: &ShaderProgram, instance_count: usize) {
        mesh.textures().bind(shader);
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.draw_elements_instanced(
                glow::TRIANGLES,
                self.index_count as i32,
                glow::UNSIGNED_INT,
                0,
                instance_count as i32,
            );
            self.gl.bind_vertex_array(None);
        }
    }
}

impl Drop for InstancingMesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_vertex_array(self.vao);
        }
    }
}
