//! Backend-agnostic frame rendering for the scene graph
//!
//! The engine walks a [`Scene`] depth-first, uploads any mesh whose data
//! changed, refreshes per-node model and normal matrices and issues one
//! indexed draw per mesh through a [`RenderBackend`].

use std::collections::HashMap;

use super::backend::{BufferHandle, BufferTarget, RenderBackend};
use super::program::{AttributeSlot, ProgramConfig, ShaderProgram, UniformSlot};
use crate::error::RenderError;
use crate::gfx::camera::Camera;
use crate::gfx::scene::{Light, Mesh, Node, NodeId, NodeKind, Scene};
use crate::loaders::TextFetcher;
use crate::math::{Matrix4, Vec3};

/// Renderer-wide settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererConfig {
    /// RGBA colour the frame is cleared to.
    pub background: [f32; 4],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            background: [0.1, 0.1, 0.1, 1.0],
        }
    }
}

/// What one call to [`RenderEngine::render`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub meshes_uploaded: usize,
    pub triangles: usize,
}

/// Device buffers backing one mesh node.
#[derive(Debug)]
struct MeshBuffers {
    attributes: [(AttributeSlot, BufferHandle, bool); 3],
    indices: BufferHandle,
    index_count: u32,
}

impl MeshBuffers {
    fn create<B: RenderBackend>(backend: &mut B) -> Self {
        let attributes = AttributeSlot::ALL.map(|slot| (slot, backend.create_buffer(), false));
        Self {
            attributes,
            indices: backend.create_buffer(),
            index_count: 0,
        }
    }

    fn handles(&self) -> impl Iterator<Item = BufferHandle> + '_ {
        self.attributes
            .iter()
            .map(|&(_, buffer, _)| buffer)
            .chain(std::iter::once(self.indices))
    }
}

/// Core rendering engine managing device buffers, shader programs and draw calls
///
/// The RenderEngine handles:
/// - Shader program creation from fetched sources
/// - Mesh buffer uploads, once per data change
/// - Camera and light uniform updates
/// - Depth-first scene traversal and indexed draws
pub struct RenderEngine<B: RenderBackend> {
    backend: B,
    config: RendererConfig,
    programs: Vec<ShaderProgram>,
    active_program: Option<usize>,
    camera_uploaded_for: Option<usize>,
    mesh_buffers: HashMap<NodeId, MeshBuffers>,
}

impl<B: RenderBackend> RenderEngine<B> {
    pub fn new(mut backend: B, config: RendererConfig) -> Self {
        backend.set_clear_color(config.background);
        Self {
            backend,
            config,
            programs: Vec::new(),
            active_program: None,
            camera_uploaded_for: None,
            mesh_buffers: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn set_background(&mut self, color: [f32; 4]) {
        self.config.background = color;
        self.backend.set_clear_color(color);
    }

    /// Clears the frame to the background colour.
    pub fn clear(&mut self) {
        self.backend.clear();
    }

    /// Builds a program from in-memory sources and registers it. The first
    /// registered program becomes the active one.
    ///
    /// A program that fails to compile or link is not registered.
    pub fn add_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
        config: &ProgramConfig,
    ) -> Result<usize, RenderError> {
        let program = ShaderProgram::build(&mut self.backend, vertex_source, fragment_source, config)?;
        self.programs.push(program);
        let index = self.programs.len() - 1;
        if self.active_program.is_none() {
            self.active_program = Some(index);
        }
        Ok(index)
    }

    /// Fetches both shader sources concurrently, then builds and registers
    /// the program.
    ///
    /// # Arguments
    /// * `fetcher` - Source of the shader text
    /// * `vertex_path` - Path of the vertex shader
    /// * `fragment_path` - Path of the fragment shader
    /// * `config` - Uniform and attribute names used by the shaders
    ///
    /// # Returns
    /// The index of the new program.
    pub async fn create_program<F: TextFetcher + ?Sized>(
        &mut self,
        fetcher: &F,
        vertex_path: &str,
        fragment_path: &str,
        config: &ProgramConfig,
    ) -> Result<usize, RenderError> {
        let (vertex_source, fragment_source) =
            futures::future::try_join(fetcher.fetch_text(vertex_path), fetcher.fetch_text(fragment_path)).await?;
        self.add_program(&vertex_source, &fragment_source, config)
    }

    /// Selects the program used by subsequent frames. Returns `false` for an
    /// unknown index.
    pub fn use_program(&mut self, index: usize) -> bool {
        if index >= self.programs.len() {
            log::warn!("No program with index {}", index);
            return false;
        }
        self.active_program = Some(index);
        true
    }

    pub fn active_program(&self) -> Option<&ShaderProgram> {
        self.active_program.map(|index| &self.programs[index])
    }

    pub fn programs(&self) -> &[ShaderProgram] {
        &self.programs
    }

    /// Sends a mesh's attribute and index arrays to its device buffers,
    /// creating them on first upload, and clears the mesh's changed flag.
    pub fn upload_mesh(&mut self, id: NodeId, mesh: &mut Mesh) {
        let backend = &mut self.backend;
        let buffers = self
            .mesh_buffers
            .entry(id)
            .or_insert_with(|| MeshBuffers::create(backend));

        for (slot, buffer, has_data) in buffers.attributes.iter_mut() {
            let data = match slot {
                AttributeSlot::Position => mesh.positions(),
                AttributeSlot::Normal => mesh.normals(),
                AttributeSlot::TexCoord => mesh.tex_coords(),
            };
            backend.bind_buffer(BufferTarget::Array, Some(*buffer));
            backend.upload_data(BufferTarget::Array, bytemuck::cast_slice(data));
            *has_data = !data.is_empty();
        }
        backend.bind_buffer(BufferTarget::Array, None);

        backend.bind_buffer(BufferTarget::ElementArray, Some(buffers.indices));
        backend.upload_data(BufferTarget::ElementArray, bytemuck::cast_slice(mesh.indices()));
        backend.bind_buffer(BufferTarget::ElementArray, None);
        buffers.index_count = mesh.index_count() as u32;

        log::debug!(
            "Uploaded mesh {} ({} vertices, {} indices)",
            id,
            mesh.vertex_count(),
            mesh.index_count()
        );
        mesh.mark_uploaded();
    }

    /// Writes the view, projection and eye-position uniforms of the active
    /// program and clears the camera's changed flag.
    pub fn upload_camera(&mut self, camera: &mut Camera) -> Result<(), RenderError> {
        let index = self.active_program.ok_or(RenderError::NoActiveProgram)?;
        self.backend.use_program(Some(self.programs[index].handle()));
        self.write_camera(index, camera);
        Ok(())
    }

    /// Writes the light uniforms of the active program.
    pub fn upload_light(&mut self, light: &Light) -> Result<(), RenderError> {
        let index = self.active_program.ok_or(RenderError::NoActiveProgram)?;
        self.backend.use_program(Some(self.programs[index].handle()));
        write_light(&mut self.backend, &self.programs[index], light);
        Ok(())
    }

    fn write_camera(&mut self, index: usize, camera: &mut Camera) {
        let program = &self.programs[index];
        set_matrix(&mut self.backend, program, UniformSlot::ViewMatrix, camera.view_matrix());
        set_matrix(
            &mut self.backend,
            program,
            UniformSlot::ProjectionMatrix,
            camera.projection_matrix(),
        );
        set_vec3(&mut self.backend, program, UniformSlot::CameraPosition, camera.origin());
        camera.mark_uploaded();
        self.camera_uploaded_for = Some(index);
    }

    /// Draws one frame of `scene` as seen from `camera`.
    ///
    /// Meshes are visited depth-first in child order. A mesh whose data
    /// changed is uploaded before it is drawn; the camera uniforms are only
    /// rewritten when the camera changed or the active program did. The first
    /// light of the scene, if any, feeds the light uniforms.
    pub fn render(&mut self, scene: &mut Scene, camera: &mut Camera) -> Result<FrameStats, RenderError> {
        let index = self.active_program.ok_or(RenderError::NoActiveProgram)?;
        self.backend.use_program(Some(self.programs[index].handle()));

        camera.refresh();
        if camera.is_changed() || self.camera_uploaded_for != Some(index) {
            self.write_camera(index, camera);
        }
        if let Some(light) = scene.lights().first() {
            write_light(&mut self.backend, &self.programs[index], light);
        }

        let view = *camera.view_matrix();
        let mut stats = FrameStats::default();
        for (id, world) in scene.mesh_draw_list() {
            let Some(Node { object, kind, .. }) = scene.node_mut(id) else {
                continue;
            };
            let NodeKind::Mesh(mesh) = kind else {
                continue;
            };

            if mesh.is_changed() {
                self.upload_mesh(id, mesh);
                stats.meshes_uploaded += 1;
            }
            object.update_normal_matrix(&view, &world);

            let program = &self.programs[index];
            set_matrix(&mut self.backend, program, UniformSlot::ModelMatrix, &world);
            set_matrix(&mut self.backend, program, UniformSlot::NormalMatrix, &object.normal_matrix);

            let buffers = self
                .mesh_buffers
                .get(&id)
                .ok_or_else(|| RenderError::MeshNotUploaded { node: id.to_string() })?;
            if draw_mesh(&mut self.backend, program, buffers) {
                stats.draw_calls += 1;
                stats.triangles += buffers.index_count as usize / 3;
            }
        }

        self.backend.use_program(None);
        log::trace!("Frame rendered: {:?}", stats);
        Ok(stats)
    }

    pub fn has_buffers(&self, id: NodeId) -> bool {
        self.mesh_buffers.contains_key(&id)
    }

    /// Deletes the device buffers of the given nodes, typically the ids
    /// returned by [`Scene::remove`].
    pub fn release(&mut self, ids: &[NodeId]) {
        for id in ids {
            if let Some(buffers) = self.mesh_buffers.remove(id) {
                for buffer in buffers.handles() {
                    self.backend.delete_buffer(buffer);
                }
            }
        }
    }

    /// Deletes buffers whose node no longer exists in `scene`. Returns the
    /// number of meshes released.
    pub fn release_stale(&mut self, scene: &Scene) -> usize {
        let stale: Vec<NodeId> = self
            .mesh_buffers
            .keys()
            .copied()
            .filter(|&id| !scene.contains(id))
            .collect();
        self.release(&stale);
        stale.len()
    }
}

fn set_matrix<B: RenderBackend>(backend: &mut B, program: &ShaderProgram, slot: UniformSlot, value: &Matrix4) {
    if let Some(location) = program.uniform(slot) {
        backend.set_uniform_matrix4(location, value);
    }
}

fn set_vec3<B: RenderBackend>(backend: &mut B, program: &ShaderProgram, slot: UniformSlot, value: Vec3) {
    if let Some(location) = program.uniform(slot) {
        backend.set_uniform_vec3(location, value);
    }
}

fn set_float<B: RenderBackend>(backend: &mut B, program: &ShaderProgram, slot: UniformSlot, value: f32) {
    if let Some(location) = program.uniform(slot) {
        backend.set_uniform_float(location, value);
    }
}

fn write_light<B: RenderBackend>(backend: &mut B, program: &ShaderProgram, light: &Light) {
    match light {
        Light::Point(point) => set_vec3(backend, program, UniformSlot::LightPosition, point.position),
        Light::Directional(directional) => {
            set_vec3(backend, program, UniformSlot::LightDirection, directional.direction)
        }
    }
    let color = light.color();
    set_vec3(backend, program, UniformSlot::LightAmbient, color.ambient);
    set_vec3(backend, program, UniformSlot::LightDiffuse, color.diffuse);
    set_vec3(backend, program, UniformSlot::LightSpecular, color.specular);
    set_float(backend, program, UniformSlot::LightPower, color.power);
}

/// Binds each attribute stream the program consumes, draws, then disables
/// the attributes again. Returns `false` when there was nothing to draw.
fn draw_mesh<B: RenderBackend>(backend: &mut B, program: &ShaderProgram, buffers: &MeshBuffers) -> bool {
    if buffers.index_count == 0 {
        return false;
    }

    let mut enabled = Vec::with_capacity(buffers.attributes.len());
    for &(slot, buffer, has_data) in &buffers.attributes {
        let Some(location) = program.attribute(slot) else {
            continue;
        };
        if !has_data {
            continue;
        }
        backend.bind_buffer(BufferTarget::Array, Some(buffer));
        backend.enable_vertex_attribute(location, slot.components());
        enabled.push(location);
    }

    backend.bind_buffer(BufferTarget::ElementArray, Some(buffers.indices));
    backend.draw_indexed_triangles(buffers.index_count);

    for location in enabled {
        backend.disable_vertex_attribute(location);
    }
    backend.bind_buffer(BufferTarget::Array, None);
    backend.bind_buffer(BufferTarget::ElementArray, None);
    true
}
