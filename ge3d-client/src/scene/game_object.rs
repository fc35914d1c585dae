//! A transformable object drawn with one or more meshes.

use std::path::Path;

use ge3d_core::{cache::Shared, model::Model};

use super::WorldObject;
use crate::{
    abs::ShaderProgram,
    error::Result,
    render::{Shaders, mesh::Mesh},
    resources::{MeshList, Resources},
};

/// Where a game object's meshes come from.
pub enum Meshes {
    /// Loaded from a model file and shared with every object using the same file.
    Shared(Shared<MeshList>),
    /// Built from raw arrays and owned by this object alone.
    Owned(MeshList),
}

impl Meshes {
    pub fn as_slice(&self) -> &[Mesh] {
        match self {
            Meshes::Shared(meshes) => meshes,
            Meshes::Owned(meshes) => meshes,
        }
    }
}

pub struct GameObject {
    pub model: Model,
    meshes: Meshes,
}

impl GameObject {
    /// Creates an object drawing every mesh of a model file.
    pub fn from_file(resources: &Resources, path: &Path) -> Result<Self> {
        Ok(Self {
            model: Model::default(),
            meshes: Meshes::Shared(resources.load_model(path)?),
        })
    }

    /// Creates an object from flat vertex arrays. The optional texture is used for the
    /// ambient and diffuse slots.
    pub fn from_arrays(
        resources: &Resources,
        positions: &[f32],
        normals: &[f32],
        texcoords: &[f32],
        indices: &[u32],
        texture: Option<&Path>,
    ) -> Result<Self> {
        let texture = texture
            .map(|path| resources.load_texture(path))
            .transpose()?;
        let mesh = Mesh::from_arrays(
            resources.gl(),
            positions,
            normals,
            texcoords,
            indices,
            texture,
        )?;
        Ok(Self::from_meshes(vec![mesh]))
    }

    pub fn from_meshes(meshes: MeshList) -> Self {
        Self {
            model: Model::default(),
            meshes: Meshes::Owned(meshes),
        }
    }

    pub fn meshes(&self) -> &[Mesh] {
        self.meshes.as_slice()
    }

    pub(crate) fn set_meshes(&mut self, meshes: Meshes) {
        self.meshes = meshes;
    }

    /// Whether both objects draw the same cached mesh list.
    pub fn shares_meshes_with(&self, other: &GameObject) -> bool {
        match (&self.meshes, &other.meshes) {
            (Meshes::Shared(a), Meshes::Shared(b)) => Shared::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Draws every mesh with this object's transform. The program must be in use.
    pub fn render_with(&self, shader: &ShaderProgram) {
        shader
            .set_uniform("model", self.model.model_matrix())
            .set_uniform("normalMatrix", self.model.normal_matrix());
        for mesh in self.meshes() {
            mesh.render(shader);
        }
    }
}

impl WorldObject for GameObject {
    fn render(&mut self, shaders: &Shaders) {
        shaders.default.use_program();
        self.render_with(&shaders.default);
    }
}
