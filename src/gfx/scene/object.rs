use crate::math::{Matrix4, Vec3};

/// State shared by every scene-graph node: an optional name, the model matrix
/// that places the node in its parent's space, and the normal matrix derived
/// from it each frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object3D {
    pub name: Option<String>,
    pub model_matrix: Matrix4,
    pub normal_matrix: Matrix4,
}

impl Object3D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Resets the model matrix to the identity.
    pub fn reset_matrix(&mut self) {
        self.model_matrix.identity();
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.model_matrix.translate(offset);
    }

    pub fn rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        self.model_matrix.rotate(angle_degrees, axis);
    }

    pub fn scale(&mut self, factors: Vec3) {
        self.model_matrix.scale(factors);
    }

    /// Replaces the model matrix with a translation to `position` after an
    /// XYZ Euler rotation (radians).
    pub fn set_transform(&mut self, position: Vec3, orientation: Vec3) {
        self.model_matrix = Matrix4::from_euler_translation(position, orientation);
    }

    /// Sets the normal matrix to `transpose(inverse(view * model))`.
    ///
    /// Returns `false` when the model-view matrix is singular; the previous
    /// normal matrix is kept in that case.
    pub fn calculate_normal_matrix(&mut self, view_matrix: &Matrix4) -> bool {
        let model = self.model_matrix;
        self.update_normal_matrix(view_matrix, &model)
    }

    /// Like [`Object3D::calculate_normal_matrix`], but for a node whose world
    /// matrix has already been composed with its ancestors.
    pub(crate) fn update_normal_matrix(&mut self, view_matrix: &Matrix4, world: &Matrix4) -> bool {
        let mut model_view = *view_matrix * *world;
        if !model_view.inverse() {
            log::debug!(
                "singular model-view for '{}', keeping previous normal matrix",
                self.name().unwrap_or("<unnamed>")
            );
            return false;
        }
        model_view.transpose();
        self.normal_matrix = model_view;
        true
    }
}
