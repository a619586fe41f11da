//! # Scene Management Module
//!
//! A scene is a tree of nodes rooted in a container. Every node carries an
//! [`Object3D`] (name, model matrix, normal matrix); leaves hold [`Mesh`]
//! geometry and inner nodes are containers. The scene also owns the lights
//! and the material library meshes refer to.
//!
//! ## Key Components
//!
//! - [`Scene`] - Arena-backed node storage with the root container, lights and materials
//! - [`NodeId`] - Generational handle to a node, invalidated on removal
//! - [`Object3D`] - Per-node transform state
//! - [`Mesh`] - Flat attribute arrays with an upload-pending flag
//! - [`Light`] - Point and directional light sources
//!
//! ## Transforms
//!
//! A node's world matrix is its parent's world matrix multiplied by its own
//! model matrix, so moving a container moves everything below it.
//!
//! ```
//! use tartan::gfx::scene::{Mesh, Object3D, Scene};
//! use tartan::math::Vec3;
//!
//! let mut scene = Scene::new();
//! let group = scene.add_container(scene.root(), Object3D::named("group"));
//! let mesh = Mesh::new(vec![0.0; 9], vec![0.0; 9], vec![0, 1, 2]);
//! let leaf = scene.add_mesh(group, Object3D::named("leaf"), mesh);
//!
//! scene.object_mut(group).unwrap().translate(Vec3::new(0.0, 1.0, 0.0));
//! let world = scene.world_matrix(leaf).unwrap();
//! assert_eq!(world.transform_point(Vec3::ZERO), Vec3::new(0.0, 1.0, 0.0));
//! ```

pub mod light;
pub mod mesh;
pub mod object;
pub mod scene;

// Re-export main types
pub use light::{DirectionalLight, Light, LightColor, PointLight};
pub use mesh::Mesh;
pub use object::Object3D;
pub use scene::{Container, DepthFirst, Node, NodeId, NodeKind, Scene, SceneStatistics, Visit};
