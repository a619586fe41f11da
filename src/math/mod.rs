//! # Math Kernel
//!
//! Value types for the transform pipeline: [`Vec3`] and the column-major
//! [`Matrix4`]. Both are `bytemuck::Pod`, so they can be uploaded to a
//! rendering backend as raw bytes.
//!
//! Conversions to and from `cgmath` are provided so that code already built
//! on `cgmath` can hand its matrices to the scene graph and back.

pub mod matrix4;
pub mod vec3;

pub use matrix4::Matrix4;
pub use vec3::Vec3;

use std::f32::consts::PI;

pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees / 180.0 * PI
}

pub fn rad_to_deg(radians: f32) -> f32 {
    radians / PI * 180.0
}

impl From<cgmath::Vector3<f32>> for Vec3 {
    fn from(v: cgmath::Vector3<f32>) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for cgmath::Vector3<f32> {
    fn from(v: Vec3) -> Self {
        cgmath::Vector3::new(v.x, v.y, v.z)
    }
}

// cgmath matrices are column-major as well, so the element order carries over.
impl From<cgmath::Matrix4<f32>> for Matrix4 {
    fn from(m: cgmath::Matrix4<f32>) -> Self {
        let elements: &[f32; 16] = m.as_ref();
        Matrix4::from_cols_array(*elements)
    }
}

impl From<Matrix4> for cgmath::Matrix4<f32> {
    #[rustfmt::skip]
    fn from(m: Matrix4) -> Self {
        let e = m.elements;
        cgmath::Matrix4::new(
            e[0],  e[1],  e[2],  e[3],
            e[4],  e[5],  e[6],  e[7],
            e[8],  e[9],  e[10], e[11],
            e[12], e[13], e[14], e[15],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, SquareMatrix};

    fn assert_matches(ours: Matrix4, theirs: cgmath::Matrix4<f32>) {
        let theirs: Matrix4 = theirs.into();
        assert!(
            ours.approx_eq(&theirs, 1e-5),
            "matrices differ:\n{:?}\n{:?}",
            ours,
            theirs
        );
    }

    #[test]
    fn test_degree_conversions() {
        assert!((deg_to_rad(180.0) - PI).abs() < 1e-6);
        assert!((rad_to_deg(PI / 2.0) - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotation_matches_cgmath() {
        let axis = Vec3::new(1.0, 2.0, -0.5).normalized();
        let ours = Matrix4::rotation(37.0, axis);
        let theirs = cgmath::Matrix4::from_axis_angle(cgmath::Vector3::from(axis), Deg(37.0));
        assert_matches(ours, theirs);
    }

    #[test]
    fn test_inverse_matches_cgmath() {
        let mut m = Matrix4::rotation(-65.0, Vec3::new(0.3, 0.9, 0.1));
        m.translate(Vec3::new(4.0, -2.0, 7.5));
        m.scale(Vec3::new(2.0, 1.0, 1.0));

        let theirs = cgmath::Matrix4::from(m).invert().expect("invertible");
        let mut ours = m;
        assert!(ours.inverse());
        assert_matches(ours, theirs);
    }

    #[test]
    fn test_product_matches_cgmath() {
        let a = Matrix4::rotation(10.0, Vec3::X);
        let mut b = Matrix4::rotation(75.0, Vec3::Y);
        b.translate(Vec3::new(1.0, 2.0, 3.0));
        let theirs = cgmath::Matrix4::from(a) * cgmath::Matrix4::from(b);
        assert_matches(a * b, theirs);
    }

    #[test]
    fn test_perspective_matches_cgmath() {
        let ours = Matrix4::perspective(60.0, 16.0 / 9.0, 0.5, 250.0);
        let theirs = cgmath::perspective(Deg(60.0), 16.0 / 9.0, 0.5, 250.0);
        assert_matches(ours, theirs);
    }
}
