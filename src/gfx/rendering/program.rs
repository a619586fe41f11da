//! Shader program creation and uniform/attribute name binding.

use std::collections::HashMap;

use super::backend::{
    AttributeLocation, ProgramHandle, RenderBackend, ShaderHandle, ShaderStage, UniformLocation,
};
use crate::error::RenderError;

/// Per-frame values the engine knows how to feed to a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    ModelMatrix,
    ViewMatrix,
    ProjectionMatrix,
    NormalMatrix,
    LightPosition,
    LightDirection,
    LightAmbient,
    LightDiffuse,
    LightSpecular,
    LightPower,
    CameraPosition,
}

/// Per-vertex streams, in the order they are bound for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeSlot {
    Position,
    Normal,
    TexCoord,
}

impl AttributeSlot {
    pub const ALL: [AttributeSlot; 3] = [AttributeSlot::Position, AttributeSlot::Normal, AttributeSlot::TexCoord];

    pub fn components(self) -> u32 {
        match self {
            AttributeSlot::Position | AttributeSlot::Normal => 3,
            AttributeSlot::TexCoord => 2,
        }
    }
}

/// Maps engine slots to the variable names used by a shader pair.
///
/// The default names match the reference Phong shaders: `M`, `V`, `P`, `N`
/// for the matrices, `light_pos` or `light_dir`, `light_ambi`, `light_diff`,
/// `light_spec`, `light_pwer` for the light and `camera_pos` for the eye
/// position.
/// Slots without a name are never bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramConfig {
    pub label: String,
    uniforms: HashMap<UniformSlot, String>,
    attributes: HashMap<AttributeSlot, String>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self::empty("Default Program")
            .with_uniform(UniformSlot::ModelMatrix, "M")
            .with_uniform(UniformSlot::ViewMatrix, "V")
            .with_uniform(UniformSlot::ProjectionMatrix, "P")
            .with_uniform(UniformSlot::NormalMatrix, "N")
            .with_uniform(UniformSlot::LightPosition, "light_pos")
            .with_uniform(UniformSlot::LightDirection, "light_dir")
            .with_uniform(UniformSlot::LightAmbient, "light_ambi")
            .with_uniform(UniformSlot::LightDiffuse, "light_diff")
            .with_uniform(UniformSlot::LightSpecular, "light_spec")
            .with_uniform(UniformSlot::LightPower, "light_pwer")
            .with_uniform(UniformSlot::CameraPosition, "camera_pos")
            .with_attribute(AttributeSlot::Position, "vertex_pos")
            .with_attribute(AttributeSlot::Normal, "vertex_normal")
    }
}

impl ProgramConfig {
    /// A configuration that binds nothing.
    pub fn empty(label: &str) -> Self {
        Self {
            label: label.to_string(),
            uniforms: HashMap::new(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    /// Binds `slot` to the uniform variable `name` (builder pattern)
    ///
    /// # Arguments
    /// * `slot` - Engine value to feed
    /// * `name` - Uniform name in the shader source
    pub fn with_uniform(mut self, slot: UniformSlot, name: &str) -> Self {
        self.uniforms.insert(slot, name.to_string());
        self
    }

    /// Binds `slot` to the vertex attribute `name` (builder pattern)
    pub fn with_attribute(mut self, slot: AttributeSlot, name: &str) -> Self {
        self.attributes.insert(slot, name.to_string());
        self
    }

    pub fn without_uniform(mut self, slot: UniformSlot) -> Self {
        self.uniforms.remove(&slot);
        self
    }

    pub fn uniform_name(&self, slot: UniformSlot) -> Option<&str> {
        self.uniforms.get(&slot).map(String::as_str)
    }

    pub fn attribute_name(&self, slot: AttributeSlot) -> Option<&str> {
        self.attributes.get(&slot).map(String::as_str)
    }
}

/// A linked program with its uniform and attribute locations resolved.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    label: String,
    handle: ProgramHandle,
    uniforms: HashMap<UniformSlot, UniformLocation>,
    attributes: HashMap<AttributeSlot, AttributeLocation>,
}

impl ShaderProgram {
    /// Compiles both stages, links them and looks up every named slot.
    ///
    /// # Errors
    /// [`RenderError::ShaderCompile`] or [`RenderError::ProgramLink`] with the
    /// backend's info log.
    pub fn build<B: RenderBackend>(
        backend: &mut B,
        vertex_source: &str,
        fragment_source: &str,
        config: &ProgramConfig,
    ) -> Result<Self, RenderError> {
        let vertex = compile(backend, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile(backend, ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(err) => {
                backend.delete_shader(vertex);
                return Err(err);
            }
        };
        let handle = backend.create_program(vertex, fragment);
        let linked = backend.link_program(handle);
        // The program keeps its own reference to attached shaders.
        backend.delete_shader(vertex);
        backend.delete_shader(fragment);
        if let Err(log) = linked {
            backend.delete_program(handle);
            return Err(RenderError::ProgramLink { log });
        }

        let mut uniforms = HashMap::new();
        for (&slot, name) in &config.uniforms {
            match backend.uniform_location(handle, name) {
                Some(location) => {
                    uniforms.insert(slot, location);
                }
                None => log::warn!("Program '{}' has no uniform '{}'", config.label, name),
            }
        }

        let mut attributes = HashMap::new();
        for (&slot, name) in &config.attributes {
            match backend.attribute_location(handle, name) {
                Some(location) => {
                    attributes.insert(slot, location);
                }
                None => log::warn!("Program '{}' has no attribute '{}'", config.label, name),
            }
        }

        log::info!(
            "Linked program '{}' ({} uniforms, {} attributes)",
            config.label,
            uniforms.len(),
            attributes.len()
        );
        Ok(Self {
            label: config.label.clone(),
            handle,
            uniforms,
            attributes,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    pub fn uniform(&self, slot: UniformSlot) -> Option<UniformLocation> {
        self.uniforms.get(&slot).copied()
    }

    pub fn attribute(&self, slot: AttributeSlot) -> Option<AttributeLocation> {
        self.attributes.get(&slot).copied()
    }
}

fn compile<B: RenderBackend>(
    backend: &mut B,
    stage: ShaderStage,
    source: &str,
) -> Result<ShaderHandle, RenderError> {
    backend
        .compile_shader(stage, source)
        .map_err(|log| RenderError::ShaderCompile {
            stage: stage.to_string(),
            log,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::rendering::recording::{BackendCall, RecordingBackend};

    #[test]
    fn test_default_config_names() {
        let config = ProgramConfig::default();
        assert_eq!(config.uniform_name(UniformSlot::ModelMatrix), Some("M"));
        assert_eq!(config.uniform_name(UniformSlot::LightPower), Some("light_pwer"));
        assert_eq!(config.uniform_name(UniformSlot::LightDirection), Some("light_dir"));
        assert_eq!(config.attribute_name(AttributeSlot::Normal), Some("vertex_normal"));
        assert_eq!(config.attribute_name(AttributeSlot::TexCoord), None);
    }

    #[test]
    fn test_build_resolves_locations() {
        let mut backend = RecordingBackend::new();
        let config = ProgramConfig::default().with_attribute(AttributeSlot::TexCoord, "vertex_uv");
        let program = ShaderProgram::build(&mut backend, "void main() {}", "void main() {}", &config)
            .expect("program links");

        assert!(program.uniform(UniformSlot::ViewMatrix).is_some());
        assert!(program.uniform(UniformSlot::LightDirection).is_some());
        assert!(program.attribute(AttributeSlot::TexCoord).is_some());
        assert_eq!(
            backend.uniform_location_named("V"),
            program.uniform(UniformSlot::ViewMatrix)
        );
    }

    #[test]
    fn test_names_missing_from_the_program_are_skipped() {
        let mut backend = RecordingBackend::new().without_name("camera_pos");
        let program = ShaderProgram::build(&mut backend, "v", "f", &ProgramConfig::default())
            .expect("program links");
        assert!(program.uniform(UniformSlot::CameraPosition).is_none());
        assert!(program.uniform(UniformSlot::ModelMatrix).is_some());
    }

    #[test]
    fn test_compile_failure_reports_stage() {
        let mut backend = RecordingBackend::new().fail_compile_on("#error");
        let err = ShaderProgram::build(&mut backend, "void main() {}", "#error broken", &ProgramConfig::default())
            .unwrap_err();
        match err {
            RenderError::ShaderCompile { stage, log } => {
                assert_eq!(stage, "fragment");
                assert!(log.contains("#error"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_link_failure() {
        let mut backend = RecordingBackend::new().fail_link();
        let err = ShaderProgram::build(&mut backend, "v", "f", &ProgramConfig::default()).unwrap_err();
        assert!(matches!(err, RenderError::ProgramLink { .. }));
    }

    #[test]
    fn test_failed_builds_release_device_objects() {
        let mut backend = RecordingBackend::new().fail_compile_on("#error");
        ShaderProgram::build(&mut backend, "void main() {}", "#error", &ProgramConfig::default()).unwrap_err();
        assert_eq!(backend.live_shader_count(), 0);
        assert_eq!(backend.count_calls(|c| matches!(c, BackendCall::DeleteShader(_))), 1);

        let mut backend = RecordingBackend::new().fail_link();
        ShaderProgram::build(&mut backend, "v", "f", &ProgramConfig::default()).unwrap_err();
        assert_eq!(backend.live_shader_count(), 0);
        assert_eq!(backend.live_program_count(), 0);
    }

    #[test]
    fn test_shaders_released_after_link() {
        let mut backend = RecordingBackend::new();
        let program = ShaderProgram::build(&mut backend, "v", "f", &ProgramConfig::default()).unwrap();
        assert_eq!(backend.live_shader_count(), 0);
        assert_eq!(backend.live_program_count(), 1);

        let calls = backend.calls();
        let link = calls.iter().position(|c| *c == BackendCall::LinkProgram(program.handle()));
        let first_delete = calls.iter().position(|c| matches!(c, BackendCall::DeleteShader(_)));
        assert!(link.is_some() && link < first_delete);
    }
}
