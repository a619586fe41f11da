//! # Graphics Module
//!
//! This module contains all graphics-related functionality for the Tartan scene graph,
//! including cameras, the node hierarchy, materials, and the rendering contract.
//!
//! ## Architecture Overview
//!
//! The graphics system is organized into several key components:
//!
//! - **Camera System** ([`camera`]) - Free-flying camera with perspective and orthographic projection
//! - **Scene Management** ([`scene`]) - Mesh and container hierarchy, lights, and materials
//! - **Resource Management** ([`resources`]) - Colour and image material definitions
//! - **Rendering** ([`rendering`]) - Backend contract, shader programs, and frame traversal
//! - **Geometry** ([`geometry`]) - Procedural primitives
//!
//! ## Usage
//!
//! The graphics system is primarily used through the [`RenderEngine`] and [`Scene`] types:
//!
//! ```
//! use tartan::gfx::{Camera, RenderEngine, RecordingBackend, RendererConfig, Scene};
//! use tartan::gfx::geometry::generate_cube;
//! use tartan::gfx::scene::Object3D;
//!
//! let mut scene = Scene::new();
//! let root = scene.root();
//! scene.add_mesh(root, Object3D::named("cube"), generate_cube().into_mesh());
//!
//! let mut camera = Camera::perspective(45.0, 1.5, 0.1, 100.0);
//! let mut engine = RenderEngine::new(RecordingBackend::new(), RendererConfig::default());
//! engine.add_program("void main() {}", "void main() {}", &Default::default()).unwrap();
//!
//! let stats = engine.render(&mut scene, &mut camera).unwrap();
//! assert_eq!(stats.draw_calls, 1);
//! ```
//!
//! [`Scene`]: scene::Scene

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::{Camera, Projection};
pub use rendering::{RecordingBackend, RenderBackend, RenderEngine, RendererConfig};
pub use scene::Scene;
