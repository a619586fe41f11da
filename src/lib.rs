// src/lib.rs
//! Tartan Scene Graph
//!
//! A minimal 3D scene graph: a column-major matrix kernel, a free-flying
//! camera, a mesh and container hierarchy with materials and lights, an
//! asynchronous Wavefront OBJ/MTL importer, and a renderer that drives any
//! [`RenderBackend`](gfx::RenderBackend).

pub mod app;
pub mod error;
pub mod gfx;
pub mod loaders;
pub mod math;
pub mod prelude;

// Re-export main types for convenience
pub use app::App;
pub use error::{FetchError, ImportError, RenderError};

/// Installs `env_logger` as the global logger.
///
/// `RUST_LOG` takes precedence over `default_filter`; without either the
/// level is `info`. Calling this again after a logger is installed does
/// nothing.
pub fn init_logging(default_filter: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or(default_filter.unwrap_or("info"));
    if env_logger::Builder::from_env(env).try_init().is_ok() {
        log::debug!("logging initialized");
    }
}
