//! # Primitive Shape Generation
//!
//! Procedural shapes for scenes that do not load model files.

use super::GeometryData;
use crate::math::Vec3;

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes. Each face has
/// its own four vertices so normals stay flat, with UV coordinates from 0 to 1
/// and counter-clockwise winding seen from outside.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    // (outward normal, face-local u axis, face-local v axis), u x v == normal
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (-Vec3::Z, -Vec3::X, Vec3::Y),
        (Vec3::X, -Vec3::Z, Vec3::Y),
        (-Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, -Vec3::Z),
        (-Vec3::Y, Vec3::X, Vec3::Z),
    ];
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

    for (normal, u, v) in faces {
        let base = data.vertices.len() as u32;
        for (su, sv) in corners {
            let position = (normal + u * su + v * sv) * 0.5;
            data.vertices.push(position.to_array());
            data.normals.push(normal.to_array());
            data.tex_coords.push([(su + 1.0) * 0.5, (sv + 1.0) * 0.5]);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a square pyramid standing on the XZ plane
///
/// The base spans -0.5..0.5 on X and Z at height 0 and the apex sits at
/// (0, 1, 0). The five vertices are shared between faces, so normals are the
/// smoothed corner directions rather than flat face normals.
pub fn generate_pyramid() -> GeometryData {
    let mut data = GeometryData::new();

    data.vertices = vec![
        [-0.5, 0.0, 0.5],
        [0.5, 0.0, 0.5],
        [0.5, 0.0, -0.5],
        [-0.5, 0.0, -0.5],
        [0.0, 1.0, 0.0],
    ];
    data.normals = [
        Vec3::new(-1.0, 0.0, 1.0),
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::new(1.0, 0.0, -1.0),
        Vec3::new(-1.0, 0.0, -1.0),
        Vec3::Y,
    ]
    .iter()
    .map(|n| n.normalized().to_array())
    .collect();
    data.indices = vec![
        // Sides
        0, 1, 4, //
        1, 2, 4, //
        2, 3, 4, //
        3, 0, 4, //
        // Base
        0, 3, 1, //
        1, 3, 2,
    ];

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(data: &GeometryData, index: u32) -> Vec3 {
        Vec3::from(data.vertices[index as usize])
    }

    #[test]
    fn test_cube_geometry() {
        let cube = generate_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.tex_coords.len(), 24);

        for position in &cube.vertices {
            assert!(position.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn test_cube_winding_matches_normals() {
        let cube = generate_cube();
        for triangle in cube.indices.chunks_exact(3) {
            let (a, b, c) = (
                vertex(&cube, triangle[0]),
                vertex(&cube, triangle[1]),
                vertex(&cube, triangle[2]),
            );
            let face_normal = (b - a).cross(c - a);
            let normal = Vec3::from(cube.normals[triangle[0] as usize]);
            assert!(face_normal.dot(normal) > 0.0, "triangle {:?} is wound inwards", triangle);
        }
    }

    #[test]
    fn test_pyramid_geometry() {
        let pyramid = generate_pyramid();
        assert_eq!(pyramid.vertex_count(), 5);
        assert_eq!(pyramid.triangle_count(), 6);
        assert!(pyramid.indices.iter().all(|&i| i < 5));
        for normal in &pyramid.normals {
            assert!((Vec3::from(*normal).magnitude() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_pyramid_faces_point_outwards() {
        let pyramid = generate_pyramid();
        let centroid = Vec3::new(0.0, 0.25, 0.0);
        for triangle in pyramid.indices.chunks_exact(3) {
            let (a, b, c) = (
                vertex(&pyramid, triangle[0]),
                vertex(&pyramid, triangle[1]),
                vertex(&pyramid, triangle[2]),
            );
            let face_normal = (b - a).cross(c - a);
            assert!(face_normal.dot(a - centroid) > 0.0, "triangle {:?} faces inwards", triangle);
        }
    }
}
