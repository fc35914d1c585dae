//! Uniform and per-instance buffer objects.

use std::{cell::RefCell, rc::Rc, sync::Arc};

use ge3d_core::{
    binding::BindingPointPool,
    instances::{InstanceSink, MODEL_MATRIX_SIZE, NORMAL_MATRIX_SIZE},
};
use glow::HasContext;

use super::ShaderProgram;
use crate::error::{EngineError, Result};

/// A uniform buffer bound to its own binding point.
///
/// The binding point is taken from a shared [`BindingPointPool`] and handed back when the
/// buffer is dropped.
pub struct UniformBuffer {
    gl: Arc<glow::Context>,
    id: glow::Buffer,
    size: usize,
    binding_point: u32,
    pool: Rc<RefCell<BindingPointPool>>,
}

impl UniformBuffer {
    /// Allocates `size` bytes of uninitialised uniform storage.
    pub fn new(
        gl: &Arc<glow::Context>,
        size: usize,
        pool: &Rc<RefCell<BindingPointPool>>,
    ) -> Result<Self> {
        let id = unsafe { gl.create_buffer().map_err(EngineError::GlLoad)? };
        let binding_point = pool.borrow_mut().allocate();
        unsafe {
            gl.bind_buffer(glow::UNIFORM_BUFFER, Some(id));
            gl.buffer_data_size(glow::UNIFORM_BUFFER, size as i32, glow::DYNAMIC_DRAW);
            gl.bind_buffer(glow::UNIFORM_BUFFER, None);
            gl.bind_buffer_range(glow::UNIFORM_BUFFER, binding_point, Some(id), 0, size as i32);
        }
        Ok(Self {
            gl: Arc::clone(gl),
            id,
            size,
            binding_point,
            pool: Rc::clone(pool),
        })
    }

    pub fn binding_point(&self) -> u32 {
        self.binding_point
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Links the shader's `block` to this buffer.
    pub fn bind_to(&self, shader: &ShaderProgram, block: &str) -> &Self {
        shader.set_uniform_block_binding(block, self.binding_point);
        self
    }

    /// Overwrites `data.len()` bytes starting at `offset`.
    pub fn buffer_sub_data(&self, offset: usize, data: &[u8]) -> &Self {
        debug_assert!(offset + data.len() <= self.size);
        unsafe {
            self.gl.bind_buffer(glow::UNIFORM_BUFFER, Some(self.id));
            self.gl
                .buffer_sub_data_u8_slice(glow::UNIFORM_BUFFER, offset as i32, data);
            self.gl.bind_buffer(glow::UNIFORM_BUFFER, None);
        }
        self
    }
}

impl Drop for UniformBuffer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.id);
        }
        self.pool.borrow_mut().release(self.binding_point);
    }
}

/// GPU storage for per-instance model and normal matrices.
pub struct InstanceBuffers {
    gl: Arc<glow::Context>,
    pub(crate) model: glow::Buffer,
    pub(crate) normal: glow::Buffer,
}

impl InstanceBuffers {
    /// Allocates room for `count` instances.
    pub fn new(gl: &Arc<glow::Context>, count: usize) -> Result<Self> {
        unsafe {
            let model = gl.create_buffer().map_err(EngineError::GlLoad)?;
            let normal = match gl.create_buffer() {
                Ok(buffer) => buffer,
                Err(e) => {
                    gl.delete_buffer(model);
                    return Err(EngineError::GlLoad(e));
                }
            };
            for (buffer, stride) in [(model, MODEL_MATRIX_SIZE), (normal, NORMAL_MATRIX_SIZE)] {
                gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
                gl.buffer_data_size(
                    glow::ARRAY_BUFFER,
                    (count * stride) as i32,
                    glow::DYNAMIC_DRAW,
                );
            }
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Ok(Self {
                gl: Arc::clone(gl),
                model,
                normal,
            })
        }
    }

    fn write(&self, buffer: glow::Buffer, offset: usize, data: &[f32]) {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl.buffer_sub_data_u8_slice(
                glow::ARRAY_BUFFER,
                offset as i32,
                bytemuck::cast_slice(data),
            );
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }
}

impl InstanceSink for InstanceBuffers {
    fn write_model_matrix(&mut self, offset: usize, matrix: &[f32; 16]) {
        self.write(self.model, offset, matrix);
    }

    fn write_normal_matrix(&mut self, offset: usize, matrix: &[f32; 9]) {
        self.write(self.normal, offset, matrix);
    }
}

impl Drop for InstanceBuffers {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.model);
            self.gl.delete_buffer(self.normal);
        }
    }
}
