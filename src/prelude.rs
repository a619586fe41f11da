//! # Tartan Prelude
//!
//! Commonly used types in one import, to reduce boilerplate in applications
//! and demos.
//!
//! ```rust
//! use tartan::prelude::*;
//!
//! let mut scene = Scene::new();
//! let root = scene.root();
//! scene.add_mesh(root, Object3D::named("pyramid"), generate_pyramid().into_mesh());
//! assert_eq!(scene.get_statistics().mesh_count, 1);
//! ```

// Re-export core application types
pub use crate::app::App;
pub use crate::init_logging;

// Re-export math types
pub use crate::math::{deg_to_rad, rad_to_deg, Matrix4, Vec3};

// Re-export graphics and scene types
pub use crate::gfx::camera::{Camera, Projection};
pub use crate::gfx::geometry::{generate_cube, generate_pyramid, GeometryData};
pub use crate::gfx::rendering::{
    FrameStats, ProgramConfig, RecordingBackend, RenderBackend, RenderEngine, RendererConfig,
};
pub use crate::gfx::resources::{ColorMaterial, ImageMaterial, Material, MaterialLibrary};
pub use crate::gfx::scene::{Light, LightColor, Mesh, NodeId, Object3D, Scene};

// Re-export loading
pub use crate::loaders::{FsFetcher, ImportOptions, IndexScope, MemoryFetcher, ObjLoader, TextFetcher};

// Re-export errors
pub use crate::error::{FetchError, ImportError, RenderError};
