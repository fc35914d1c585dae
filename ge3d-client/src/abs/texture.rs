//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct, a 2D texture sampled by meshes, and
//! [`CubeMap`], the six-faced texture used by the skybox.

use std::{path::Path, sync::Arc};

use glow::HasContext;
use image::{DynamicImage, GenericImageView};

use crate::error::{EngineError, Result};

/// GL internal format and pixel format for an image with `channels` channels.
///
/// Channel counts other than 1, 3 and 4 are uploaded as RGB.
pub fn pixel_format(channels: u8) -> (u32, u32) {
    match channels {
        1 => (glow::R8, glow::RED),
        3 => (glow::RGB8, glow::RGB),
        4 => (glow::RGBA8, glow::RGBA),
        _ => (glow::RGB8, glow::RGB),
    }
}

/// Raw pixel rows of `image` laid out for [`pixel_format`] of its channel count.
fn pixel_data(image: &DynamicImage) -> Vec<u8> {
    match image.color().channel_count() {
        1 => image.to_luma8().into_raw(),
        3 => image.to_rgb8().into_raw(),
        4 => image.to_rgba8().into_raw(),
        other => {
            log::warn!("Uploading {other}-channel image as RGB");
            image.to_rgb8().into_raw()
        }
    }
}

fn open_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| EngineError::load(path, e))
}

/// Represents a texture stored on the GPU side.
pub struct Texture {
    gl: Arc<glow::Context>,
    id: glow::Texture,
    width: u32,
    height: u32,
}

impl Texture {
    /// Loads an image file into a mipmapped, repeating texture.
    pub fn from_path(gl: &Arc<glow::Context>, path: &Path) -> Result<Self> {
        let image = open_image(path)?;
        let texture = Self::new(gl, &image)?;
        log::info!(
            "Loaded texture {} ({}x{})",
            path.display(),
            texture.width,
            texture.height
        );
        Ok(texture)
    }

    /// Creates a new texture from the given [`image::DynamicImage`].
    pub fn new(gl: &Arc<glow::Context>, image: &DynamicImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        let (internal_format, format) = pixel_format(image.color().channel_count());
        let data = pixel_data(image);
        unsafe {
            let texture = gl.create_texture().map_err(EngineError::GlLoad)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal_format as i32,
                width as i32,
                height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(data.as_slice())),
            );
            gl.generate_mipmap(glow::TEXTURE_2D);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
                width,
                height,
            })
        }
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

/// Face image names of a cubemap directory, in GL face order.
pub const CUBE_MAP_FACES: [&str; 6] = [
    "right.jpg",
    "left.jpg",
    "top.jpg",
    "bottom.jpg",
    "front.jpg",
    "back.jpg",
];

/// A cubemap texture.
pub struct CubeMap {
    gl: Arc<glow::Context>,
    id: glow::Texture,
}

impl CubeMap {
    /// Loads the six faces found in `directory` under the names in [`CUBE_MAP_FACES`].
    pub fn from_directory(gl: &Arc<glow::Context>, directory: &Path) -> Result<Self> {
        let faces = CUBE_MAP_FACES.map(|name| directory.join(name));
        Self::from_faces(gl, &faces)
    }

    /// Loads a cubemap from six images ordered right, left, top, bottom, front, back.
    ///
    /// Fails on the first face that can't be decoded, releasing the texture.
    pub fn from_faces(gl: &Arc<glow::Context>, faces: &[impl AsRef<Path>; 6]) -> Result<Self> {
        let id = unsafe { gl.create_texture().map_err(EngineError::GlLoad)? };
        let cube_map = Self {
            gl: Arc::clone(gl),
            id,
        };

        unsafe {
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(id));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        }
        for (i, face) in faces.iter().enumerate() {
            let image = open_image(face.as_ref())?;
            let (width, height) = image.dimensions();
            let data = image.to_rgb8().into_raw();
            unsafe {
                gl.tex_image_2d(
                    glow::TEXTURE_CUBE_MAP_POSITIVE_X + i as u32,
                    0,
                    glow::RGB as i32,
                    width as i32,
                    height as i32,
                    0,
                    glow::RGB,
                    glow::UNSIGNED_BYTE,
                    glow::PixelUnpackData::Slice(Some(data.as_slice())),
                );
            }
        }

        unsafe {
            for (parameter, value) in [
                (glow::TEXTURE_MIN_FILTER, glow::LINEAR),
                (glow::TEXTURE_MAG_FILTER, glow::LINEAR),
                (glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE),
                (glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE),
                (glow::TEXTURE_WRAP_R, glow::CLAMP_TO_EDGE),
            ] {
                gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP, parameter, value as i32);
            }
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);
        }

        Ok(cube_map)
    }

    pub fn bind(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(self.id));
        }
    }
}

impl Drop for CubeMap {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}
