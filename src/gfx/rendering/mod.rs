// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Handles shader programs, device buffer management, and frame rendering
//! through a pluggable [`RenderBackend`].

pub mod backend;
pub mod program;
pub mod recording;
pub mod render_engine;

// Re-export main types
pub use backend::{
    AttributeLocation, BufferHandle, BufferTarget, ProgramHandle, RenderBackend, ShaderHandle, ShaderStage,
    UniformLocation,
};
pub use program::{AttributeSlot, ProgramConfig, ShaderProgram, UniformSlot};
pub use recording::{BackendCall, RecordingBackend, UniformValue};
pub use render_engine::{FrameStats, RenderEngine, RendererConfig};
