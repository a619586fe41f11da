//! A [`RenderBackend`] that records every call instead of drawing.
//!
//! Used by the test suite and the demos to observe what the engine sends to
//! a device: upload counts, uniform values, attribute enable/disable order.

use std::collections::{HashMap, HashSet};

use super::backend::{
    AttributeLocation, BufferHandle, BufferTarget, ProgramHandle, RenderBackend, ShaderHandle, ShaderStage,
    UniformLocation,
};
use crate::math::{Matrix4, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateBuffer(BufferHandle),
    DeleteBuffer(BufferHandle),
    BindBuffer(BufferTarget, Option<BufferHandle>),
    UploadData { target: BufferTarget, bytes: usize },
    CompileShader(ShaderStage),
    CreateProgram(ProgramHandle),
    LinkProgram(ProgramHandle),
    DeleteShader(ShaderHandle),
    DeleteProgram(ProgramHandle),
    UseProgram(Option<ProgramHandle>),
    SetUniform(UniformLocation, UniformValue),
    EnableVertexAttribute { location: AttributeLocation, components: u32 },
    DisableVertexAttribute(AttributeLocation),
    DrawIndexedTriangles(u32),
    SetClearColor([f32; 4]),
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Matrix4(Matrix4),
    Vec3(Vec3),
    Float(f32),
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    next_id: u32,
    buffers: HashMap<BufferHandle, Vec<u8>>,
    shaders: HashSet<ShaderHandle>,
    programs: HashSet<ProgramHandle>,
    bound: HashMap<BufferTarget, BufferHandle>,
    uniform_names: HashMap<String, UniformLocation>,
    attribute_names: HashMap<String, AttributeLocation>,
    uniform_values: HashMap<UniformLocation, UniformValue>,
    missing_names: HashSet<String>,
    compile_failure_marker: Option<String>,
    link_fails: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the backend report `name` as absent from every program.
    pub fn without_name(mut self, name: &str) -> Self {
        self.missing_names.insert(name.to_string());
        self
    }

    /// Rejects any shader whose source contains `marker`.
    pub fn fail_compile_on(mut self, marker: &str) -> Self {
        self.compile_failure_marker = Some(marker.to_string());
        self
    }

    pub fn fail_link(mut self) -> Self {
        self.link_fails = true;
        self
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Returns and forgets the calls recorded so far.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn count_calls(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn uniform_location_named(&self, name: &str) -> Option<UniformLocation> {
        self.uniform_names.get(name).copied()
    }

    pub fn attribute_location_named(&self, name: &str) -> Option<AttributeLocation> {
        self.attribute_names.get(name).copied()
    }

    /// Last value written to the uniform called `name`.
    pub fn uniform_value(&self, name: &str) -> Option<UniformValue> {
        self.uniform_location_named(name)
            .and_then(|location| self.uniform_values.get(&location).copied())
    }

    pub fn buffer_contents(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_shader_count(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_program_count(&self) -> usize {
        self.programs.len()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderBackend for RecordingBackend {
    fn create_buffer(&mut self) -> BufferHandle {
        let buffer = BufferHandle(self.next_id());
        self.buffers.insert(buffer, Vec::new());
        self.calls.push(BackendCall::CreateBuffer(buffer));
        buffer
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer);
        self.bound.retain(|_, bound| *bound != buffer);
        self.calls.push(BackendCall::DeleteBuffer(buffer));
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) {
        match buffer {
            Some(buffer) => self.bound.insert(target, buffer),
            None => self.bound.remove(&target),
        };
        self.calls.push(BackendCall::BindBuffer(target, buffer));
    }

    fn upload_data(&mut self, target: BufferTarget, data: &[u8]) {
        if let Some(contents) = self
            .bound
            .get(&target)
            .and_then(|buffer| self.buffers.get_mut(buffer))
        {
            *contents = data.to_vec();
        }
        self.calls.push(BackendCall::UploadData {
            target,
            bytes: data.len(),
        });
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String> {
        self.calls.push(BackendCall::CompileShader(stage));
        match &self.compile_failure_marker {
            Some(marker) if source.contains(marker.as_str()) => {
                Err(format!("ERROR: 0:1: '{}' : rejected", marker))
            }
            _ => {
                let shader = ShaderHandle(self.next_id());
                self.shaders.insert(shader);
                Ok(shader)
            }
        }
    }

    fn create_program(&mut self, _vertex: ShaderHandle, _fragment: ShaderHandle) -> ProgramHandle {
        let program = ProgramHandle(self.next_id());
        self.programs.insert(program);
        self.calls.push(BackendCall::CreateProgram(program));
        program
    }

    fn link_program(&mut self, program: ProgramHandle) -> Result<(), String> {
        self.calls.push(BackendCall::LinkProgram(program));
        if self.link_fails {
            Err("ERROR: program did not link".to_string())
        } else {
            Ok(())
        }
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
        self.calls.push(BackendCall::DeleteShader(shader));
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        self.calls.push(BackendCall::DeleteProgram(program));
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.calls.push(BackendCall::UseProgram(program));
    }

    fn uniform_location(&mut self, _program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        if self.missing_names.contains(name) {
            return None;
        }
        let next = UniformLocation(self.uniform_names.len() as u32);
        Some(*self.uniform_names.entry(name.to_string()).or_insert(next))
    }

    fn attribute_location(&mut self, _program: ProgramHandle, name: &str) -> Option<AttributeLocation> {
        if self.missing_names.contains(name) {
            return None;
        }
        let next = AttributeLocation(self.attribute_names.len() as u32);
        Some(*self.attribute_names.entry(name.to_string()).or_insert(next))
    }

    fn set_uniform_matrix4(&mut self, location: UniformLocation, value: &Matrix4) {
        let value = UniformValue::Matrix4(*value);
        self.uniform_values.insert(location, value);
        self.calls.push(BackendCall::SetUniform(location, value));
    }

    fn set_uniform_vec3(&mut self, location: UniformLocation, value: Vec3) {
        let value = UniformValue::Vec3(value);
        self.uniform_values.insert(location, value);
        self.calls.push(BackendCall::SetUniform(location, value));
    }

    fn set_uniform_float(&mut self, location: UniformLocation, value: f32) {
        let value = UniformValue::Float(value);
        self.uniform_values.insert(location, value);
        self.calls.push(BackendCall::SetUniform(location, value));
    }

    fn enable_vertex_attribute(&mut self, location: AttributeLocation, components: u32) {
        self.calls.push(BackendCall::EnableVertexAttribute { location, components });
    }

    fn disable_vertex_attribute(&mut self, location: AttributeLocation) {
        self.calls.push(BackendCall::DisableVertexAttribute(location));
    }

    fn draw_indexed_triangles(&mut self, index_count: u32) {
        self.calls.push(BackendCall::DrawIndexedTriangles(index_count));
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.calls.push(BackendCall::SetClearColor(color));
    }

    fn clear(&mut self) {
        self.calls.push(BackendCall::Clear);
    }
}
