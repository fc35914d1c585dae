//! Mesh management module.
//!
//! This module defines the [`Mesh`] struct for managing textured, indexed triangle data
//! on the GPU side. Vertices should implement the [`Vertex`] trait.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use ge3d_core::cache::Shared;
use glam::{Vec2, Vec3};
use glow::HasContext;

use crate::{
    abs::{ShaderProgram, Texture},
    error::{EngineError, Result},
};

/// Trait that defines the necessary methods for a vertex.
pub trait Vertex {
    /// Sets up the vertex attribute pointers for the vertex.
    fn vertex_attribs(gl: &glow::Context);
}

/// Position, normal and texture coordinate of one mesh vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub texcoord: Vec2,
}

impl Vertex for MeshVertex {
    fn vertex_attribs(gl: &glow::Context) {
        unsafe {
            let stride = std::mem::size_of::<MeshVertex>() as i32;

            // Position attribute
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);

            // Normal attribute
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                1,
                3,
                glow::FLOAT,
                false,
                stride,
                std::mem::size_of::<Vec3>() as i32,
            );

            // Texture coordinate attribute
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(
                2,
                2,
                glow::FLOAT,
                false,
                stride,
                2 * std::mem::size_of::<Vec3>() as i32,
            );
        }
    }
}

/// Zips flat position, normal and texcoord arrays into vertices.
///
/// Positions and normals hold three floats per vertex, texcoords two. Missing normals
/// or texcoords default to zero; any other length mismatch is an error.
pub fn interleave(
    positions: &[f32],
    normals: &[f32],
    texcoords: &[f32],
) -> Result<Vec<MeshVertex>> {
    if positions.len() % 3 != 0 {
        return Err(EngineError::load(
            "<vertex data>",
            format!("{} position floats is not a multiple of 3", positions.len()),
        ));
    }
    let count = positions.len() / 3;
    if !normals.is_empty() && normals.len() != count * 3 {
        return Err(EngineError::load(
            "<vertex data>",
            format!("expected {} normal floats, got {}", count * 3, normals.len()),
        ));
    }
    if !texcoords.is_empty() && texcoords.len() != count * 2 {
        return Err(EngineError::load(
            "<vertex data>",
            format!("expected {} texcoord floats, got {}", count * 2, texcoords.len()),
        ));
    }

    Ok((0..count)
        .map(|i| MeshVertex {
            position: Vec3::from_slice(&positions[i * 3..]),
            normal: normals
                .get(i * 3..i * 3 + 3)
                .map_or(Vec3::ZERO, Vec3::from_slice),
            texcoord: texcoords
                .get(i * 2..i * 2 + 2)
                .map_or(Vec2::ZERO, Vec2::from_slice),
        })
        .collect())
}

/// Textures sampled by a mesh, grouped by material slot.
#[derive(Default)]
pub struct MeshTextures {
    pub ambient: Vec<Shared<Texture>>,
    pub diffuse: Vec<Shared<Texture>>,
    pub specular: Vec<Shared<Texture>>,
}

impl MeshTextures {
    /// The same texture in the ambient and diffuse slots.
    pub fn single(texture: Shared<Texture>) -> Self {
        Self {
            ambient: vec![texture.clone()],
            diffuse: vec![texture],
            specular: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.ambient.len() + self.diffuse.len() + self.specular.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Binds every texture to consecutive units starting at 0 and points the
    /// `material.<kind>Texture<N>` samplers at them.
    pub fn bind(&self, shader: &ShaderProgram) {
        let mut unit = 0;
        for (kind, textures) in [
            ("ambient", &self.ambient),
            ("diffuse", &self.diffuse),
            ("specular", &self.specular),
        ] {
            for (i, texture) in textures.iter().enumerate() {
                texture.bind(unit);
                shader.set_uniform(&format!("material.{kind}Texture{i}"), unit as i32);
                unit += 1;
            }
        }
    }
}

/// Vertex array, vertex buffer and index buffer of one mesh, released together.
pub(crate) struct MeshBuffers {
    gl: Arc<glow::Context>,
    pub(crate) vao: glow::VertexArray,
    pub(crate) vbo: glow::Buffer,
    pub(crate) ebo: glow::Buffer,
}

impl MeshBuffers {
    fn new(gl: &Arc<glow::Context>) -> Result<Self> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(EngineError::GlLoad)?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(e) => {
                    gl.delete_vertex_array(vao);
                    return Err(EngineError::GlLoad(e));
                }
            };
            let ebo = match gl.create_buffer() {
                Ok(ebo) => ebo,
                Err(e) => {
                    gl.delete_buffer(vbo);
                    gl.delete_vertex_array(vao);
                    return Err(EngineError::GlLoad(e));
                }
            };
            Ok(Self {
                gl: Arc::clone(gl),
                vao,
                vbo,
                ebo,
            })
        }
    }
}

impl Drop for MeshBuffers {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_buffer(self.ebo);
            self.gl.delete_vertex_array(self.vao);
        }
    }
}

/// Represents a mesh stored on the GPU side.
pub struct Mesh {
    gl: Arc<glow::Context>,
    buffers: MeshBuffers,
    textures: MeshTextures,
    index_count: usize,
}

impl Mesh {
    /// Uploads vertex and index data and takes ownership of the texture handles.
    pub fn new<V: Vertex + Pod>(
        gl: &Arc<glow::Context>,
        vertices: &[V],
        indices: &[u32],
        textures: MeshTextures,
    ) -> Result<Self> {
        let buffers = MeshBuffers::new(gl)?;
        unsafe {
            gl.bind_vertex_array(Some(buffers.vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffers.vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                glow::STATIC_DRAW,
            );

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(buffers.ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            );

            V::vertex_attribs(gl);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
        }

        Ok(Self {
            gl: Arc::clone(gl),
            buffers,
            textures,
            index_count: indices.len(),
        })
    }

    /// Builds a mesh from flat attribute arrays, see [`interleave`].
    pub fn from_arrays(
        gl: &Arc<glow::Context>,
        positions: &[f32],
        normals: &[f32],
        texcoords: &[f32],
        indices: &[u32],
        texture: Option<Shared<Texture>>,
    ) -> Result<Self> {
        let vertices = interleave(positions, normals, texcoords)?;
        let textures = texture.map(MeshTextures::single).unwrap_or_default();
        Self::new(gl, &vertices, indices, textures)
    }

    /// Draws the mesh with its textures bound.
    pub fn render(&self, shader: &ShaderProgram) {
        self.textures.bind(shader);
        unsafe {
            self.gl.bind_vertex_array(Some(self.buffers.vao));
            self.gl.draw_elements(
                glow::TRIANGLES,
                self.index_count as i32,
                glow::UNSIGNED_INT,
                0,
            );
            self.gl.bind_vertex_array(None);
        }
    }

    pub fn textures(&self) -> &MeshTextures {
        &self.textures
    }

    pub(crate) fn buffers(&self) -> &MeshBuffers {
        &self.buffers
    }

    /// Returns the amount of indices used in the mesh.
    pub fn index_count(&self) -> usize {
        self.index_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
    }

    #[test]
    fn interleave_zips_attributes() {
        let vertices = interleave(
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            &[0.0, 0.0, 1.0, 0.0, 1.0, 0.0],
            &[0.5, 0.25, 1.0, 1.0],
        )
        .unwrap();

        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[1].position, Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(vertices[1].normal, Vec3::Y);
        assert_eq!(vertices[0].texcoord, Vec2::new(0.5, 0.25));
    }

    #[test]
    fn interleave_defaults_missing_attributes() {
        let vertices = interleave(&[1.0, 2.0, 3.0], &[], &[]).unwrap();
        assert_eq!(vertices[0].normal, Vec3::ZERO);
        assert_eq!(vertices[0].texcoord, Vec2::ZERO);
    }

    #[test]
    fn interleave_rejects_mismatched_lengths() {
        assert!(interleave(&[1.0, 2.0], &[], &[]).is_err());
        assert!(interleave(&[1.0, 2.0, 3.0], &[0.0, 1.0], &[]).is_err());
        assert!(interleave(&[1.0, 2.0, 3.0], &[], &[0.0]).is_err());
    }
}
