//! This module contains the thin OpenGL wrappers the engine is built on,
//! including application setup, shader management, textures and buffers.

pub mod app;
pub mod buffer;
pub mod shader;
pub mod texture;

pub use app::*;
pub use buffer::*;
pub use shader::*;
pub use texture::*;
