//! Column-major 4x4 matrix.
//!
//! Element `(row r, column c)` lives at index `c * 4 + r`, which is the layout
//! shader uniforms expect, so a [`Matrix4`] can be uploaded without
//! transposition. Mutating operations work in place on the receiver; the
//! `*ed`/`Mul` variants return new values.

use std::ops::{Index, IndexMut, Mul};

use super::{deg_to_rad, Vec3};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Matrix4 {
    pub elements: [f32; 16],
}

impl Default for Matrix4 {
    /// The identity matrix.
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    #[rustfmt::skip]
    pub const IDENTITY: Matrix4 = Matrix4 {
        elements: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub const ZERO: Matrix4 = Matrix4 { elements: [0.0; 16] };

    /// Creates an identity matrix.
    pub const fn new() -> Self {
        Self::IDENTITY
    }

    /// Wraps 16 column-major elements.
    pub const fn from_cols_array(elements: [f32; 16]) -> Self {
        Self { elements }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.elements
    }

    /// Element at row `row`, column `col`.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.elements[col * 4 + row]
    }

    /// Resets to the identity.
    pub fn identity(&mut self) {
        *self = Self::IDENTITY;
    }

    /// Adds `offset` to the translation column (indices 12, 13, 14).
    ///
    /// This is an additive shortcut, not a product with a translation matrix:
    /// the offset is applied in the parent space after every other transform
    /// already held by the matrix.
    pub fn translate(&mut self, offset: Vec3) {
        self.elements[12] += offset.x;
        self.elements[13] += offset.y;
        self.elements[14] += offset.z;
    }

    /// Rotation of `angle_degrees` around `axis` (Rodrigues' formula).
    ///
    /// # Panics
    /// Panics if `axis` has zero length.
    pub fn rotation(angle_degrees: f32, axis: Vec3) -> Self {
        let axis = axis.normalized();
        let (x, y, z) = (axis.x, axis.y, axis.z);
        let (s, c) = deg_to_rad(angle_degrees).sin_cos();
        let cm = 1.0 - c;

        #[rustfmt::skip]
        let elements = [
            c + x * x * cm,     y * x * cm + z * s, z * x * cm - y * s, 0.0,
            x * y * cm - z * s, c + y * y * cm,     z * y * cm + x * s, 0.0,
            x * z * cm + y * s, y * z * cm - x * s, c + z * z * cm,     0.0,
            0.0,                0.0,                0.0,                1.0,
        ];
        Self { elements }
    }

    /// Pre-multiplies by a rotation (`self = R * self`), so successive calls
    /// compose on the left.
    pub fn rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        self.premultiply(&Self::rotation(angle_degrees, axis));
    }

    /// Multiplies the diagonal scale terms (indices 0, 5, 10).
    ///
    /// Only equivalent to a full scale when the upper 3x3 carries no rotation;
    /// a rotated matrix keeps its off-diagonal terms unscaled.
    pub fn scale(&mut self, factors: Vec3) {
        self.elements[0] *= factors.x;
        self.elements[5] *= factors.y;
        self.elements[10] *= factors.z;
    }

    /// `self = self * rhs`
    pub fn multiply(&mut self, rhs: &Matrix4) {
        *self = product(self, rhs);
    }

    /// `self = lhs * self`
    pub fn premultiply(&mut self, lhs: &Matrix4) {
        *self = product(lhs, self);
    }

    pub fn determinant(&self) -> f32 {
        adjugate(&self.elements).1
    }

    /// Inverts in place through the adjugate matrix.
    ///
    /// Returns `false` and leaves the matrix untouched when the determinant is
    /// exactly zero.
    pub fn inverse(&mut self) -> bool {
        match self.inverted() {
            Some(inverse) => {
                *self = inverse;
                true
            }
            None => false,
        }
    }

    /// The inverse, or `None` for a singular matrix.
    pub fn inverted(&self) -> Option<Matrix4> {
        let (mut inv, det) = adjugate(&self.elements);
        if det == 0.0 {
            return None;
        }
        let inv_det = 1.0 / det;
        for value in inv.iter_mut() {
            *value *= inv_det;
        }
        Some(Self { elements: inv })
    }

    /// Swaps the off-diagonal pairs in place.
    pub fn transpose(&mut self) {
        let m = &mut self.elements;
        m.swap(1, 4);
        m.swap(2, 8);
        m.swap(3, 12);
        m.swap(6, 9);
        m.swap(7, 13);
        m.swap(11, 14);
    }

    pub fn transposed(&self) -> Matrix4 {
        let mut result = *self;
        result.transpose();
        result
    }

    /// Transforms a point (`w = 1`) without a perspective divide.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        let m = &self.elements;
        Vec3::new(
            m[0] * point.x + m[4] * point.y + m[8] * point.z + m[12],
            m[1] * point.x + m[5] * point.y + m[9] * point.z + m[13],
            m[2] * point.x + m[6] * point.y + m[10] * point.z + m[14],
        )
    }

    /// Transforms a direction (`w = 0`).
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        let m = &self.elements;
        Vec3::new(
            m[0] * vector.x + m[4] * vector.y + m[8] * vector.z,
            m[1] * vector.x + m[5] * vector.y + m[9] * vector.z,
            m[2] * vector.x + m[6] * vector.y + m[10] * vector.z,
        )
    }

    /// Rotation from XYZ Euler angles in radians (`Rz * Ry * Rx`) followed by
    /// a translation to `position`.
    pub fn from_euler_translation(position: Vec3, orientation: Vec3) -> Matrix4 {
        let (sin_x, cos_x) = orientation.x.sin_cos();
        let (sin_y, cos_y) = orientation.y.sin_cos();
        let (sin_z, cos_z) = orientation.z.sin_cos();

        #[rustfmt::skip]
        let elements = [
            cos_y * cos_z,
            cos_y * sin_z,
            -sin_y,
            0.0,

            sin_x * sin_y * cos_z - cos_x * sin_z,
            sin_x * sin_y * sin_z + cos_x * cos_z,
            sin_x * cos_y,
            0.0,

            cos_x * sin_y * cos_z + sin_x * sin_z,
            cos_x * sin_y * sin_z - sin_x * cos_z,
            cos_x * cos_y,
            0.0,

            position.x, position.y, position.z, 1.0,
        ];
        Matrix4 { elements }
    }

    /// Perspective projection mapping the given frustum to clip space.
    ///
    /// # Panics
    /// Panics unless `0 < near < far` and the side planes are distinct.
    pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Matrix4 {
        assert!(
            near > 0.0 && near < far,
            "frustum requires 0 < near < far (near = {}, far = {})",
            near,
            far
        );
        assert!(
            right != left && top != bottom,
            "frustum side planes must not coincide"
        );

        let x = 2.0 * near / (right - left);
        let y = 2.0 * near / (top - bottom);
        let a = (right + left) / (right - left);
        let b = (top + bottom) / (top - bottom);
        let c = -(far + near) / (far - near);
        let d = -2.0 * far * near / (far - near);

        #[rustfmt::skip]
        let elements = [
            x,   0.0, 0.0,  0.0,
            0.0, y,   0.0,  0.0,
            a,   b,   c,   -1.0,
            0.0, 0.0, d,    0.0,
        ];
        Matrix4 { elements }
    }

    /// Symmetric perspective projection from a vertical field of view.
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
        let ymax = near * deg_to_rad(fov_degrees * 0.5).tan();
        let xmax = ymax * aspect;
        Self::frustum(-xmax, xmax, -ymax, ymax, near, far)
    }

    /// Orthographic projection of the box bounded by the six planes.
    ///
    /// # Panics
    /// Panics if any pair of opposite planes coincides.
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4 {
        assert!(
            right != left && top != bottom && far != near,
            "orthographic planes must not coincide"
        );

        let w = 1.0 / (right - left);
        let h = 1.0 / (top - bottom);
        let p = 1.0 / (far - near);

        #[rustfmt::skip]
        let elements = [
            2.0 * w,               0.0,                   0.0,                 0.0,
            0.0,                   2.0 * h,               0.0,                 0.0,
            0.0,                   0.0,                  -2.0 * p,             0.0,
            -(right + left) * w,   -(top + bottom) * h,   -(far + near) * p,   1.0,
        ];
        Matrix4 { elements }
    }

    pub fn approx_eq(&self, other: &Matrix4, epsilon: f32) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

fn product(a: &Matrix4, b: &Matrix4) -> Matrix4 {
    let a = &a.elements;
    let b = &b.elements;
    let mut out = [0.0f32; 16];
    for col in 0..4 {
        for row in 0..4 {
            out[col * 4 + row] = a[row] * b[col * 4]
                + a[4 + row] * b[col * 4 + 1]
                + a[8 + row] * b[col * 4 + 2]
                + a[12 + row] * b[col * 4 + 3];
        }
    }
    Matrix4 { elements: out }
}

/// Cofactor expansion: returns the adjugate and the determinant.
#[rustfmt::skip]
fn adjugate(m: &[f32; 16]) -> ([f32; 16], f32) {
    let mut inv = [0.0f32; 16];

    inv[0]  =  m[5]  * m[10] * m[15] - m[5]  * m[11] * m[14] - m[9]  * m[6]  * m[15]
             + m[9]  * m[7]  * m[14] + m[13] * m[6]  * m[11] - m[13] * m[7]  * m[10];
    inv[4]  = -m[4]  * m[10] * m[15] + m[4]  * m[11] * m[14] + m[8]  * m[6]  * m[15]
             - m[8]  * m[7]  * m[14] - m[12] * m[6]  * m[11] + m[12] * m[7]  * m[10];
    inv[8]  =  m[4]  * m[9]  * m[15] - m[4]  * m[11] * m[13] - m[8]  * m[5]  * m[15]
             + m[8]  * m[7]  * m[13] + m[12] * m[5]  * m[11] - m[12] * m[7]  * m[9];
    inv[12] = -m[4]  * m[9]  * m[14] + m[4]  * m[10] * m[13] + m[8]  * m[5]  * m[14]
             - m[8]  * m[6]  * m[13] - m[12] * m[5]  * m[10] + m[12] * m[6]  * m[9];

    inv[1]  = -m[1]  * m[10] * m[15] + m[1]  * m[11] * m[14] + m[9]  * m[2]  * m[15]
             - m[9]  * m[3]  * m[14] - m[13] * m[2]  * m[11] + m[13] * m[3]  * m[10];
    inv[5]  =  m[0]  * m[10] * m[15] - m[0]  * m[11] * m[14] - m[8]  * m[2]  * m[15]
             + m[8]  * m[3]  * m[14] + m[12] * m[2]  * m[11] - m[12] * m[3]  * m[10];
    inv[9]  = -m[0]  * m[9]  * m[15] + m[0]  * m[11] * m[13] + m[8]  * m[1]  * m[15]
             - m[8]  * m[3]  * m[13] - m[12] * m[1]  * m[11] + m[12] * m[3]  * m[9];
    inv[13] =  m[0]  * m[9]  * m[14] - m[0]  * m[10] * m[13] - m[8]  * m[1]  * m[14]
             + m[8]  * m[2]  * m[13] + m[12] * m[1]  * m[10] - m[12] * m[2]  * m[9];

    inv[2]  =  m[1]  * m[6]  * m[15] - m[1]  * m[7]  * m[14] - m[5]  * m[2]  * m[15]
             + m[5]  * m[3]  * m[14] + m[13] * m[2]  * m[7]  - m[13] * m[3]  * m[6];
    inv[6]  = -m[0]  * m[6]  * m[15] + m[0]  * m[7]  * m[14] + m[4]  * m[2]  * m[15]
             - m[4]  * m[3]  * m[14] - m[12] * m[2]  * m[7]  + m[12] * m[3]  * m[6];
    inv[10] =  m[0]  * m[5]  * m[15] - m[0]  * m[7]  * m[13] - m[4]  * m[1]  * m[15]
             + m[4]  * m[3]  * m[13] + m[12] * m[1]  * m[7]  - m[12] * m[3]  * m[5];
    inv[14] = -m[0]  * m[5]  * m[14] + m[0]  * m[6]  * m[13] + m[4]  * m[1]  * m[14]
             - m[4]  * m[2]  * m[13] - m[12] * m[1]  * m[6]  + m[12] * m[2]  * m[5];

    inv[3]  = -m[1]  * m[6]  * m[11] + m[1]  * m[7]  * m[10] + m[5]  * m[2]  * m[11]
             - m[5]  * m[3]  * m[10] - m[9]  * m[2]  * m[7]  + m[9]  * m[3]  * m[6];
    inv[7]  =  m[0]  * m[6]  * m[11] - m[0]  * m[7]  * m[10] - m[4]  * m[2]  * m[11]
             + m[4]  * m[3]  * m[10] + m[8]  * m[2]  * m[7]  - m[8]  * m[3]  * m[6];
    inv[11] = -m[0]  * m[5]  * m[11] + m[0]  * m[7]  * m[9]  + m[4]  * m[1]  * m[11]
             - m[4]  * m[3]  * m[9]  - m[8]  * m[1]  * m[7]  + m[8]  * m[3]  * m[5];
    inv[15] =  m[0]  * m[5]  * m[10] - m[0]  * m[6]  * m[9]  - m[4]  * m[1]  * m[10]
             + m[4]  * m[2]  * m[9]  + m[8]  * m[1]  * m[6]  - m[8]  * m[2]  * m[5];

    let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
    (inv, det)
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        product(&self, &rhs)
    }
}

impl Index<usize> for Matrix4 {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.elements[index]
    }
}

impl IndexMut<usize> for Matrix4 {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.elements[index]
    }
}
