//! # Procedural Geometry Generation
//!
//! Generates primitive shapes procedurally, so test scenes and demos do not
//! need external model files.
//!
//! ## Supported Primitives
//!
//! - **Cube**: Unit cube with flat per-face normals
//! - **Pyramid**: Square pyramid with shared, smoothed vertices
//!
//! ## Usage
//!
//! ```rust
//! use tartan::gfx::geometry::{generate_cube, generate_pyramid};
//!
//! let cube = generate_cube().into_mesh();
//! assert_eq!(cube.triangle_count(), 12);
//!
//! let pyramid = generate_pyramid().into_mesh();
//! assert_eq!(pyramid.vertex_count(), 5);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::Mesh;

/// Represents generated geometry data before it becomes a [`Mesh`]
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flattens the per-vertex arrays into a mesh ready for upload
    pub fn into_mesh(self) -> Mesh {
        let positions = self.vertices.into_iter().flatten().collect();
        let normals = self.normals.into_iter().flatten().collect();
        let tex_coords = self.tex_coords.into_iter().flatten().collect();
        Mesh::new(positions, normals, self.indices).with_tex_coords(tex_coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_mesh_flattens_attributes() {
        let mesh = generate_cube().into_mesh();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.positions().len(), 72);
        assert_eq!(mesh.normals().len(), 72);
        assert_eq!(mesh.tex_coords().len(), 48);
        assert!(mesh.is_changed());
    }

    #[test]
    fn test_pyramid_mesh_has_no_tex_coords() {
        let mesh = generate_pyramid().into_mesh();
        assert!(mesh.tex_coords().is_empty());
        assert_eq!(mesh.index_count(), 18);
    }
}
