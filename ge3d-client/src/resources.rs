//! Loading of models and textures through the shared caches.
//!
//! Everything loaded here is cached by file name: loading a model or image that is
//! still referenced somewhere returns the existing GPU data instead of reading the file
//! again.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use ge3d_core::cache::{ResourceCache, Shared};

use crate::{
    abs::Texture,
    error::{EngineError, Result},
    render::mesh::{Mesh, MeshTextures, interleave},
};

/// The meshes making up one model file.
pub type MeshList = Vec<Mesh>;

/// Owner of the texture and mesh caches.
pub struct Resources {
    gl: Arc<glow::Context>,
    meshes: ResourceCache<MeshList>,
    textures: ResourceCache<Texture>,
}

impl Resources {
    pub fn new(gl: &Arc<glow::Context>) -> Self {
        Self {
            gl: Arc::clone(gl),
            meshes: ResourceCache::new("mesh"),
            textures: ResourceCache::new("texture"),
        }
    }

    pub fn gl(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    pub fn mesh_cache(&self) -> &ResourceCache<MeshList> {
        &self.meshes
    }

    pub fn texture_cache(&self) -> &ResourceCache<Texture> {
        &self.textures
    }

    /// Loads a 2D texture, or reuses the live one with the same file name.
    pub fn load_texture(&self, path: &Path) -> Result<Shared<Texture>> {
        self.textures
            .acquire(path, |path| Texture::from_path(&self.gl, path))
    }

    /// Loads every mesh of a Wavefront OBJ file along with its material textures, or
    /// reuses the live mesh list with the same file name.
    pub fn load_model(&self, path: &Path) -> Result<Shared<MeshList>> {
        self.meshes.acquire(path, |path| self.read_model(path))
    }

    fn read_model(&self, path: &Path) -> Result<MeshList> {
        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|e| EngineError::load(path, e))?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("No materials for {}: {e}", path.display());
            Vec::new()
        });
        let directory = path.parent().unwrap_or(Path::new(""));

        let mut meshes = Vec::with_capacity(models.len());
        for model in &models {
            let mesh = &model.mesh;
            // Image rows start at the top, OBJ texture coordinates at the bottom.
            let texcoords: Vec<f32> = mesh
                .texcoords
                .chunks_exact(2)
                .flat_map(|uv| [uv[0], 1.0 - uv[1]])
                .collect();
            let vertices = interleave(&mesh.positions, &mesh.normals, &texcoords)
                .map_err(|e| EngineError::load(path, e))?;

            let textures = match mesh.material_id.and_then(|id| materials.get(id)) {
                Some(material) => self.material_textures(material, directory)?,
                None => MeshTextures::default(),
            };

            meshes.push(Mesh::new(&self.gl, &vertices, &mesh.indices, textures)?);
        }

        log::info!(
            "Loaded model {} ({} meshes)",
            path.display(),
            meshes.len()
        );
        Ok(meshes)
    }

    fn material_textures(
        &self,
        material: &tobj::Material,
        directory: &Path,
    ) -> Result<MeshTextures> {
        let load = |name: &Option<String>| -> Result<Vec<Shared<Texture>>> {
            name.iter()
                .map(|name| self.load_texture(&resolve(directory, name)))
                .collect()
        };
        Ok(MeshTextures {
            ambient: load(&material.ambient_texture)?,
            diffuse: load(&material.diffuse_texture)?,
            specular: load(&material.specular_texture)?,
        })
    }
}

/// Resolves a material's texture reference against the model's directory.
fn resolve(directory: &Path, name: &str) -> PathBuf {
    directory.join(name.replace('\\', "/"))
}
