//! Flat textured primitives.

use std::path::{Path, PathBuf};

use ge3d_core::input::{InputEvent, InputState};
use glam::Vec2;

use super::{
    WorldObject,
    game_object::{GameObject, Meshes},
};
use crate::{error::Result, render::{Shaders, mesh::Mesh}, resources::Resources};

#[rustfmt::skip]
const POSITIONS: [f32; 12] = [
     0.5, -0.5, 0.0,
     0.5,  0.5, 0.0,
    -0.5,  0.5, 0.0,
    -0.5, -0.5, 0.0,
];

#[rustfmt::skip]
const NORMALS: [f32; 12] = [
    0.0, 0.0, 1.0,
    0.0, 0.0, 1.0,
    0.0, 0.0, 1.0,
    0.0, 0.0, 1.0,
];

#[rustfmt::skip]
const TEXCOORDS: [f32; 8] = [
    1.0, 1.0,
    1.0, 0.0,
    0.0, 0.0,
    0.0, 1.0,
];

const INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Unit square texture coordinates scaled by `repeat` along u and v.
pub fn repeated_texcoords(repeat: Vec2) -> [f32; 8] {
    let mut texcoords = TEXCOORDS;
    for (i, tc) in texcoords.iter_mut().enumerate() {
        *tc *= if i % 2 == 0 { repeat.x } else { repeat.y };
    }
    texcoords
}

fn square_mesh(resources: &Resources, texture: Option<&Path>, repeat: Vec2) -> Result<Mesh> {
    let texture = texture
        .map(|path| resources.load_texture(path))
        .transpose()?;
    Mesh::from_arrays(
        resources.gl(),
        &POSITIONS,
        &NORMALS,
        &repeated_texcoords(repeat),
        &INDICES,
        texture,
    )
}

/// A unit square in the local XY plane facing +Z.
pub fn quad(resources: &Resources, texture: Option<&Path>, repeat: Vec2) -> Result<GameObject> {
    Ok(GameObject::from_meshes(vec![square_mesh(
        resources, texture, repeat,
    )?]))
}

/// A textured square whose texture tiling can be changed after creation.
pub struct Plane {
    pub object: GameObject,
    texture: Option<PathBuf>,
}

impl Plane {
    pub fn new(resources: &Resources, texture: Option<&Path>) -> Result<Self> {
        Ok(Self {
            object: quad(resources, texture, Vec2::ONE)?,
            texture: texture.map(Path::to_path_buf),
        })
    }

    /// Rebuilds the mesh with the texture repeated `repeat` times along both axes.
    pub fn set_texture_repeat(&mut self, resources: &Resources, repeat: f32) -> Result<&mut Self> {
        let mesh = square_mesh(resources, self.texture.as_deref(), Vec2::splat(repeat))?;
        self.object.set_meshes(Meshes::Owned(vec![mesh]));
        Ok(self)
    }
}

impl WorldObject for Plane {
    fn update(&mut self, dt: f32) {
        self.object.update(dt);
    }

    fn handle_input(&mut self, event: &InputEvent, state: &InputState) {
        self.object.handle_input(event, state);
    }

    fn render(&mut self, shaders: &Shaders) {
        self.object.render(shaders);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texcoords_scale_per_axis() {
        let texcoords = repeated_texcoords(Vec2::new(4.0, 2.0));
        assert_eq!(texcoords, [4.0, 2.0, 4.0, 0.0, 0.0, 0.0, 0.0, 2.0]);
        assert_eq!(repeated_texcoords(Vec2::ONE), TEXCOORDS);
    }

    #[test]
    fn square_indices_cover_both_triangles() {
        assert_eq!(INDICES.len(), 6);
        assert!(INDICES.iter().all(|&i| (i as usize) < POSITIONS.len() / 3));
    }
}
