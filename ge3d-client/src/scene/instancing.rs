//! Many copies of one model drawn with a single draw call per mesh.

use std::path::Path;

use ge3d_core::{
    cache::Shared,
    instances::{InstanceMut, InstanceSet},
    model::Model,
};

use super::WorldObject;
use crate::{
    abs::{InstanceBuffers, ShaderProgram},
    error::Result,
    render::{Shaders, instancing::InstancingMesh},
    resources::{MeshList, Resources},
};

/// A fixed number of transforms sharing one model file.
///
/// Only instances touched through [`instance_mut`](Self::instance_mut),
/// [`mark_dirty`](Self::mark_dirty) or [`update_all`](Self::update_all) are uploaded on
/// the next render; every instance is drawn.
pub struct InstancingGameObjects {
    instanced: Vec<InstancingMesh>,
    buffers: InstanceBuffers,
    meshes: Shared<MeshList>,
    instances: InstanceSet,
}

impl InstancingGameObjects {
    pub fn new(resources: &Resources, path: &Path, count: usize) -> Result<Self> {
        let meshes = resources.load_model(path)?;
        let buffers = InstanceBuffers::new(resources.gl(), count)?;
        let instanced = meshes
            .iter()
            .map(|mesh| InstancingMesh::new(resources.gl(), mesh, &buffers))
            .collect::<Result<Vec<_>>>()?;
        log::info!(
            "Created {count} instances of {} ({} meshes)",
            path.display(),
            meshes.len()
        );
        Ok(Self {
            instanced,
            buffers,
            meshes,
            instances: InstanceSet::new(count),
        })
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Model> {
        self.instances.get(index)
    }

    /// Mutable access to one instance; it is re-uploaded on the next render.
    pub fn instance_mut(&mut self, index: usize) -> Option<InstanceMut<'_>> {
        self.instances.instance_mut(index)
    }

    pub fn mark_dirty(&mut self, index: usize) {
        self.instances.mark_dirty(index);
    }

    pub fn update_all(&mut self, f: impl FnMut(usize, &mut Model)) {
        self.instances.update_all(f);
    }

    pub fn meshes(&self) -> &Shared<MeshList> {
        &self.meshes
    }

    /// Uploads stale instances and draws all of them. The program must be in use.
    pub fn render_with(&mut self, shader: &ShaderProgram) {
        self.instances.flush(&mut self.buffers);
        for (instanced, mesh) in self.instanced.iter().zip(self.meshes.iter()) {
            instanced.render(mesh, shader, self.instances.len());
        }
    }
}

impl WorldObject for InstancingGameObjects {
    fn render(&mut self, shaders: &Shaders) {
        shaders.instancing.use_program();
        self.render_with(&shaders.instancing);
    }
}
