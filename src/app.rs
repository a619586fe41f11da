use crate::error::{ImportError, RenderError};
use crate::gfx::{
    camera::Camera,
    rendering::{FrameStats, ProgramConfig, RenderBackend, RenderEngine, RendererConfig},
    scene::{NodeId, Scene},
};
use crate::loaders::{ObjLoader, TextFetcher};

/// Frame driver owning a scene, the camera looking at it and the engine
/// drawing it.
///
/// Window and input handling stay with the host: it forwards size changes to
/// [`App::resize`] and calls [`App::render_frame`] once per frame.
pub struct App<B: RenderBackend> {
    scene: Scene,
    camera: Camera,
    render_engine: RenderEngine<B>,
}

impl<B: RenderBackend> App<B> {
    /// Create an application with an empty scene and a 45 degree perspective
    /// camera at the origin looking down -Z
    pub fn new(backend: B, config: RendererConfig) -> Self {
        Self {
            scene: Scene::new(),
            camera: Camera::perspective(45.0, 1.0, 0.1, 100.0),
            render_engine: RenderEngine::new(backend, config),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn engine(&self) -> &RenderEngine<B> {
        &self.render_engine
    }

    pub fn engine_mut(&mut self) -> &mut RenderEngine<B> {
        &mut self.render_engine
    }

    /// Fetches, builds and registers a shader program. Returns its index.
    pub async fn load_program<F: TextFetcher + ?Sized>(
        &mut self,
        fetcher: &F,
        vertex_path: &str,
        fragment_path: &str,
        config: &ProgramConfig,
    ) -> Result<usize, RenderError> {
        self.render_engine
            .create_program(fetcher, vertex_path, fragment_path, config)
            .await
    }

    /// Imports a model and attaches it under the scene root as a container
    /// named after the file.
    pub async fn load_model<F: TextFetcher>(
        &mut self,
        loader: &ObjLoader<F>,
        path: &str,
    ) -> Result<NodeId, ImportError> {
        let model = loader.load(path).await?;
        let root = self.scene.root();
        Ok(self.scene.add_model(root, model_name(path), model))
    }

    /// Refits the projection to a new surface size. A zero size, as reported
    /// for minimized windows, is ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize_projection(width, height);
    }

    /// Clears the frame and draws the scene.
    pub fn render_frame(&mut self) -> Result<FrameStats, RenderError> {
        self.render_engine.clear();
        self.render_engine.render(&mut self.scene, &mut self.camera)
    }

    /// Removes a node with its subtree and frees their device buffers.
    /// Returns the number of nodes removed.
    pub fn remove(&mut self, id: NodeId) -> usize {
        let removed = self.scene.remove(id);
        self.render_engine.release(&removed);
        removed.len()
    }
}

/// File stem of `path`, or the whole path when it has none.
fn model_name(path: &str) -> &str {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    }
}
