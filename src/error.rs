//! Error types shared by the loaders and the render engine.

use thiserror::Error;

/// The fetch collaborator could not deliver a text resource.
#[derive(Debug, Clone, Error)]
#[error("failed to fetch '{path}': {reason}")]
pub struct FetchError {
    pub path: String,
    pub reason: String,
}

impl FetchError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Which attribute stream a face index points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    TexCoord,
    Normal,
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttributeKind::Position => "position",
            AttributeKind::TexCoord => "texture coordinate",
            AttributeKind::Normal => "normal",
        };
        f.write_str(name)
    }
}

/// A geometry/material import failed. No partial scene is produced.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("line {line}: {attribute} index {index} is out of range for mesh '{mesh}' ({available} available)")]
    IndexOutOfRange {
        mesh: String,
        line: usize,
        attribute: AttributeKind,
        index: i64,
        available: usize,
    },

    #[error("line {line}: cannot parse '{token}' as a number")]
    MalformedNumber { line: usize, token: String },

    #[error("line {line}: face has {vertices} vertices, at least 3 are required")]
    DegenerateFace { line: usize, vertices: usize },

    #[error("line {line}: usemtl '{material}' without any mtllib reference")]
    MissingMaterialLibrary { line: usize, material: String },

    #[error("import was aborted")]
    Aborted,
}

/// The rendering backend rejected a shader program, or drawing was attempted
/// without one.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: String, log: String },

    #[error("program failed to link: {log}")]
    ProgramLink { log: String },

    #[error("no shader program is active")]
    NoActiveProgram,

    #[error("mesh node {node} has no uploaded buffers")]
    MeshNotUploaded { node: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
