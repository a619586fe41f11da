//! The contract between the render engine and a graphics API.
//!
//! The engine never talks to a device directly. Everything it needs (buffer
//! objects, shader compilation, uniform and attribute binding, indexed
//! draws) goes through [`RenderBackend`], which a WebGL, OpenGL or wgpu
//! binding implements. Handles are opaque ids minted by the backend.

use std::fmt;

use crate::math::{Matrix4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeLocation(pub u32);

/// Binding point for buffer uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data.
    Array,
    /// Triangle indices.
    ElementArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Operations the render engine issues against a graphics device.
///
/// Compile and link failures are reported as the backend's info log. Asking
/// for an unknown uniform or attribute name yields `None`; the engine then
/// skips that binding.
pub trait RenderBackend {
    fn create_buffer(&mut self) -> BufferHandle;
    fn delete_buffer(&mut self, buffer: BufferHandle);
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>);
    /// Replaces the contents of the buffer bound to `target`.
    fn upload_data(&mut self, target: BufferTarget, data: &[u8]);

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String>;
    fn create_program(&mut self, vertex: ShaderHandle, fragment: ShaderHandle) -> ProgramHandle;
    fn link_program(&mut self, program: ProgramHandle) -> Result<(), String>;
    /// Releases a shader object. A shader still attached to a linked program
    /// lives on until that program is deleted.
    fn delete_shader(&mut self, shader: ShaderHandle);
    fn delete_program(&mut self, program: ProgramHandle);
    fn use_program(&mut self, program: Option<ProgramHandle>);

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;
    fn attribute_location(&mut self, program: ProgramHandle, name: &str) -> Option<AttributeLocation>;
    fn set_uniform_matrix4(&mut self, location: UniformLocation, value: &Matrix4);
    fn set_uniform_vec3(&mut self, location: UniformLocation, value: Vec3);
    fn set_uniform_float(&mut self, location: UniformLocation, value: f32);

    /// Points `location` at the buffer bound to [`BufferTarget::Array`],
    /// reading `components` floats per vertex, and enables it.
    fn enable_vertex_attribute(&mut self, location: AttributeLocation, components: u32);
    fn disable_vertex_attribute(&mut self, location: AttributeLocation);
    /// Draws `index_count` indices from the bound element buffer as triangles.
    fn draw_indexed_triangles(&mut self, index_count: u32);

    fn set_clear_color(&mut self, color: [f32; 4]);
    fn clear(&mut self);
}
