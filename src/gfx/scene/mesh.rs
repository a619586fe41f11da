use crate::gfx::resources::MaterialId;
use crate::math::Vec3;

/// Indexed triangle geometry in flat attribute arrays.
///
/// `positions` and `normals` hold three floats per vertex, `tex_coords` two.
/// Every index refers to a vertex slot present in all non-empty arrays.
///
/// The `changed` flag is raised by every setter and cleared by the render
/// engine once the data has been uploaded, so each change is uploaded once.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<f32>,
    normals: Vec<f32>,
    tex_coords: Vec<f32>,
    indices: Vec<u32>,
    material: Option<MaterialId>,
    changed: bool,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }
}

impl Mesh {
    pub fn new(positions: Vec<f32>, normals: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals,
            tex_coords: Vec::new(),
            indices,
            material: None,
            changed: true,
        }
    }

    pub fn with_tex_coords(mut self, tex_coords: Vec<f32>) -> Self {
        self.set_tex_coords(tex_coords);
        self
    }

    pub fn with_material(mut self, material: impl Into<MaterialId>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn tex_coords(&self) -> &[f32] {
        &self.tex_coords
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn set_positions(&mut self, positions: Vec<f32>) {
        self.positions = positions;
        self.changed = true;
    }

    pub fn set_normals(&mut self, normals: Vec<f32>) {
        self.normals = normals;
        self.changed = true;
    }

    pub fn set_tex_coords(&mut self, tex_coords: Vec<f32>) {
        self.tex_coords = tex_coords;
        self.changed = true;
    }

    pub fn set_indices(&mut self, indices: Vec<u32>) {
        self.indices = indices;
        self.changed = true;
    }

    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    pub fn set_material(&mut self, material: Option<MaterialId>) {
        self.material = material;
    }

    /// True while the attribute data differs from what was last uploaded.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Forces a re-upload on the next frame.
    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub(crate) fn mark_uploaded(&mut self) {
        self.changed = false;
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// Replaces the normals with smooth vertex normals averaged from the
    /// faces sharing each vertex. Used for geometry that ships without any.
    pub fn generate_normals(&mut self) {
        self.set_normals(smooth_normals(&self.positions, &self.indices));
    }
}

/// Area-weighted vertex normals for an indexed triangle list.
pub fn smooth_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex = |i: u32| {
        let i = i as usize * 3;
        Vec3::new(positions[i], positions[i + 1], positions[i + 2])
    };

    let mut accumulated = vec![Vec3::ZERO; positions.len() / 3];
    for triangle in indices.chunks_exact(3) {
        let (a, b, c) = (vertex(triangle[0]), vertex(triangle[1]), vertex(triangle[2]));
        let face_normal = (b - a).cross(c - a);
        for &index in triangle {
            accumulated[index as usize] += face_normal;
        }
    }

    accumulated
        .into_iter()
        .flat_map(|n| n.try_normalized().unwrap_or(Vec3::ZERO).to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        Mesh::new(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            Vec::new(),
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn test_new_mesh_needs_upload() {
        let mut mesh = quad();
        assert!(mesh.is_changed());
        mesh.mark_uploaded();
        assert!(!mesh.is_changed());
    }

    #[test]
    fn test_setters_raise_changed_flag() {
        let mut mesh = quad();
        mesh.mark_uploaded();
        mesh.set_indices(vec![0, 1, 2]);
        assert!(mesh.is_changed());
        assert_eq!(mesh.triangle_count(), 1);

        mesh.mark_uploaded();
        mesh.set_material(Some("paint".to_string()));
        assert!(!mesh.is_changed(), "material assignment does not touch buffers");
        assert_eq!(mesh.material(), Some("paint"));
    }

    #[test]
    fn test_counts() {
        let mesh = quad().with_tex_coords(vec![0.0; 8]);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.tex_coords().len(), 8);
    }

    #[test]
    fn test_generate_normals_for_flat_quad() {
        let mut mesh = quad();
        assert!(!mesh.has_normals());
        mesh.generate_normals();

        assert_eq!(mesh.normals().len(), 12);
        for normal in mesh.normals().chunks_exact(3) {
            assert!(Vec3::new(normal[0], normal[1], normal[2]).approx_eq(Vec3::Z, 1e-6));
        }
    }

    #[test]
    fn test_unreferenced_vertex_gets_zero_normal() {
        let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0, 5.0, 5.0];
        let normals = smooth_normals(&positions, &[0, 1, 2]);
        assert_eq!(&normals[9..], &[0.0, 0.0, 0.0]);
    }
}
