use super::projection::Projection;
use crate::math::{deg_to_rad, Matrix4, Vec3};

/// A free-flying camera described by an orthonormal basis and an origin.
///
/// The camera looks down `forward`. `right`, `up` and `forward` stay
/// mutually orthogonal unit vectors: `look_at` builds them that way and
/// every yaw/pitch/roll re-orthonormalizes afterwards, so drift does not
/// accumulate over long sessions.
///
/// Moves and rotations only touch the basis. The view matrix is rebuilt by
/// [`Camera::update_view_matrix`], or lazily by [`Camera::refresh`] which the
/// render engine calls once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    origin: Vec3,
    view_matrix: Matrix4,
    projection_matrix: Matrix4,
    projection: Option<Projection>,
    view_stale: bool,
    changed: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// A camera at the origin looking down -Z with an identity projection.
    pub fn new() -> Self {
        let mut camera = Self {
            right: Vec3::X,
            up: Vec3::Y,
            forward: -Vec3::Z,
            origin: Vec3::ZERO,
            view_matrix: Matrix4::IDENTITY,
            projection_matrix: Matrix4::IDENTITY,
            projection: None,
            view_stale: false,
            changed: true,
        };
        camera.update_view_matrix();
        camera
    }

    /// A camera with a symmetric perspective projection.
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self::new();
        camera.make_perspective(fov_degrees, aspect, near, far);
        camera
    }

    /// A camera with an orthographic projection.
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let mut camera = Self::new();
        camera.make_orthographic(left, right, bottom, top, near, far);
        camera
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
        self.view_stale = true;
    }

    pub fn view_matrix(&self) -> &Matrix4 {
        &self.view_matrix
    }

    pub fn projection_matrix(&self) -> &Matrix4 {
        &self.projection_matrix
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4 {
        self.projection_matrix * self.view_matrix
    }

    /// True while the view or projection matrix differs from what was last
    /// uploaded.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub(crate) fn mark_uploaded(&mut self) {
        self.changed = false;
    }

    /// Resets the basis to right=+X, up=+Y, forward=-Z at the world origin.
    pub fn reset_view_matrix(&mut self) {
        self.right = Vec3::X;
        self.up = Vec3::Y;
        self.forward = -Vec3::Z;
        self.origin = Vec3::ZERO;
        self.update_view_matrix();
    }

    /// Rebuilds the view matrix from the basis and origin.
    ///
    /// The rotation part is the transposed basis and the translation part is
    /// the origin projected onto each axis, negated, so the result is the
    /// inverse of the camera's world transform.
    pub fn update_view_matrix(&mut self) {
        let (r, u, f, o) = (self.right, self.up, self.forward, self.origin);
        let v = &mut self.view_matrix.elements;

        v[0] = r.x;
        v[1] = u.x;
        v[2] = -f.x;
        v[3] = 0.0;

        v[4] = r.y;
        v[5] = u.y;
        v[6] = -f.y;
        v[7] = 0.0;

        v[8] = r.z;
        v[9] = u.z;
        v[10] = -f.z;
        v[11] = 0.0;

        v[12] = -r.dot(o);
        v[13] = -u.dot(o);
        v[14] = f.dot(o);
        v[15] = 1.0;

        self.view_stale = false;
        self.changed = true;
    }

    /// Rebuilds the view matrix if the camera moved or turned since the
    /// last rebuild.
    pub fn refresh(&mut self) {
        if self.view_stale {
            self.update_view_matrix();
        }
    }

    pub fn move_right(&mut self, units: f32) {
        self.origin += self.right * units;
        self.view_stale = true;
    }

    pub fn move_left(&mut self, units: f32) {
        self.move_right(-units);
    }

    pub fn move_forward(&mut self, units: f32) {
        self.origin += self.forward * units;
        self.view_stale = true;
    }

    pub fn move_backwards(&mut self, units: f32) {
        self.move_forward(-units);
    }

    pub fn move_up(&mut self, units: f32) {
        self.origin += self.up * units;
        self.view_stale = true;
    }

    /// Turns about the `up` axis. Positive angles turn towards the left.
    pub fn yaw(&mut self, angle_degrees: f32) {
        let (sin, cos) = deg_to_rad(angle_degrees).sin_cos();
        let (right, forward) = (self.right, self.forward);
        self.right = right * cos + forward * sin;
        self.forward = forward * cos - right * sin;
        self.orthonormalize();
    }

    /// Tilts about the `right` axis. Positive angles look upwards.
    pub fn pitch(&mut self, angle_degrees: f32) {
        let (sin, cos) = deg_to_rad(angle_degrees).sin_cos();
        let (forward, up) = (self.forward, self.up);
        self.forward = forward * cos + up * sin;
        self.up = up * cos - forward * sin;
        self.orthonormalize();
    }

    /// Banks about the `forward` axis. Positive angles roll clockwise as
    /// seen from behind the camera.
    pub fn roll(&mut self, angle_degrees: f32) {
        let (sin, cos) = deg_to_rad(angle_degrees).sin_cos();
        let (right, up) = (self.right, self.up);
        self.right = right * cos + up * sin;
        self.up = up * cos - right * sin;
        self.orthonormalize();
    }

    /// Gram-Schmidt with `forward` as the anchor axis.
    pub fn orthonormalize(&mut self) {
        self.forward.normalize();
        self.right = (self.right - self.forward * self.right.dot(self.forward)).normalized();
        self.up = self.right.cross(self.forward);
        self.view_stale = true;
    }

    /// Places the camera at `position` looking at `target` and rebuilds the
    /// view matrix.
    ///
    /// # Panics
    /// Panics if `target == position` or if `world_up` is parallel to the
    /// viewing direction.
    pub fn look_at(&mut self, position: Vec3, target: Vec3, world_up: Vec3) {
        self.origin = position;
        self.forward = (target - position).normalized();
        self.right = self.forward.cross(world_up).normalized();
        self.up = self.right.cross(self.forward).normalized();
        self.update_view_matrix();
    }

    /// Symmetric perspective projection from a vertical field of view.
    ///
    /// # Panics
    /// Panics unless `0 < near < far`.
    pub fn make_perspective(&mut self, fov_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.set_projection(Projection::Perspective {
            fov: fov_degrees,
            aspect,
            near,
            far,
        });
    }

    /// Perspective projection through the given near-plane rectangle.
    ///
    /// # Panics
    /// Panics unless `0 < near < far`.
    pub fn frustum(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.set_projection(Projection::Frustum {
            left,
            right,
            bottom,
            top,
            near,
            far,
        });
    }

    pub fn make_orthographic(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.set_projection(Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            near,
            far,
        });
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection_matrix = projection.matrix();
        self.projection = Some(projection);
        self.changed = true;
    }

    /// Adapts the projection to a resized viewport.
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return;
        }
        if let Some(projection) = self.projection {
            self.set_projection(projection.with_aspect(width as f32 / height as f32));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPS: f32 = 1e-5;

    fn assert_orthonormal(camera: &Camera) {
        let (r, u, f) = (camera.right(), camera.up(), camera.forward());
        assert!(r.dot(u).abs() < EPS, "right.up = {}", r.dot(u));
        assert!(r.dot(f).abs() < EPS, "right.forward = {}", r.dot(f));
        assert!(u.dot(f).abs() < EPS, "up.forward = {}", u.dot(f));
        for axis in [r, u, f] {
            assert!((axis.magnitude() - 1.0).abs() < EPS, "|{:?}| != 1", axis);
        }
    }

    #[test]
    fn test_new_camera_has_reset_basis() {
        let camera = Camera::new();
        assert_eq!(camera.right(), Vec3::X);
        assert_eq!(camera.up(), Vec3::Y);
        assert_eq!(camera.forward(), -Vec3::Z);
        assert_eq!(*camera.view_matrix(), Matrix4::IDENTITY);
        assert!(camera.is_changed());
    }

    #[test]
    fn test_look_at_down_negative_z() {
        let mut camera = Camera::new();
        camera.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);

        assert!(camera.forward().approx_eq(-Vec3::Z, EPS));
        assert!(camera.right().approx_eq(Vec3::X, EPS));
        assert!(camera.up().approx_eq(Vec3::Y, EPS));
        assert_orthonormal(&camera);

        let eye_space = camera.view_matrix().transform_point(Vec3::ZERO);
        assert!(eye_space.approx_eq(Vec3::new(0.0, 0.0, -5.0), EPS));
    }

    #[test]
    fn test_look_at_matches_cgmath() {
        let eye = Vec3::new(3.0, 4.0, -2.0);
        let target = Vec3::new(-1.0, 0.5, 6.0);
        let mut camera = Camera::new();
        camera.look_at(eye, target, Vec3::Y);

        let theirs = cgmath::Matrix4::look_at_rh(
            cgmath::Point3::new(eye.x, eye.y, eye.z),
            cgmath::Point3::new(target.x, target.y, target.z),
            cgmath::Vector3::unit_y(),
        );
        assert!(camera.view_matrix().approx_eq(&Matrix4::from(theirs), EPS));
    }

    #[test]
    fn test_view_matrix_inverts_camera_world_transform() {
        let mut camera = Camera::new();
        camera.look_at(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, -1.0, 0.0), Vec3::Y);

        // Camera-to-world: basis as columns, origin as translation.
        let (r, u, f, o) = (camera.right(), camera.up(), camera.forward(), camera.origin());
        let world = Matrix4::from_cols_array([
            r.x, r.y, r.z, 0.0, u.x, u.y, u.z, 0.0, -f.x, -f.y, -f.z, 0.0, o.x, o.y, o.z, 1.0,
        ]);
        let product = *camera.view_matrix() * world;
        assert!(product.approx_eq(&Matrix4::IDENTITY, EPS));
    }

    #[test]
    fn test_yaw_updates_both_axes_from_same_snapshot() {
        let mut camera = Camera::new();
        camera.yaw(90.0);
        assert!(camera.right().approx_eq(-Vec3::Z, EPS));
        assert!(camera.forward().approx_eq(-Vec3::X, EPS));
        assert!(camera.up().approx_eq(Vec3::Y, EPS));

        camera.yaw(-90.0);
        assert!(camera.right().approx_eq(Vec3::X, EPS));
        assert!(camera.forward().approx_eq(-Vec3::Z, EPS));
    }

    #[test]
    fn test_pitch_and_roll() {
        let mut camera = Camera::new();
        camera.pitch(90.0);
        assert!(camera.forward().approx_eq(Vec3::Y, EPS));
        assert!(camera.up().approx_eq(Vec3::Z, EPS));
        assert!(camera.right().approx_eq(Vec3::X, EPS));

        let mut camera = Camera::new();
        camera.roll(90.0);
        assert!(camera.right().approx_eq(Vec3::Y, EPS));
        assert!(camera.up().approx_eq(-Vec3::X, EPS));
        assert!(camera.forward().approx_eq(-Vec3::Z, EPS));
    }

    #[test]
    fn test_basis_stays_orthonormal_under_random_rotations() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut camera = Camera::new();
        camera.look_at(Vec3::new(2.0, 1.0, 7.0), Vec3::ZERO, Vec3::Y);

        for _ in 0..10_000 {
            let angle = rng.random_range(-30.0..30.0);
            match rng.random_range(0..3) {
                0 => camera.yaw(angle),
                1 => camera.pitch(angle),
                _ => camera.roll(angle),
            }
        }
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_moves_follow_basis_and_refresh_lazily() {
        let mut camera = Camera::new();
        camera.mark_uploaded();

        camera.move_forward(2.0);
        camera.move_right(1.0);
        camera.move_left(3.0);
        camera.move_backwards(0.5);
        assert!(camera.origin().approx_eq(Vec3::new(-2.0, 0.0, -1.5), EPS));
        assert!(!camera.is_changed(), "moves do not rebuild the view matrix");

        camera.refresh();
        assert!(camera.is_changed());
        let eye_space = camera.view_matrix().transform_point(camera.origin());
        assert!(eye_space.approx_eq(Vec3::ZERO, EPS));

        camera.mark_uploaded();
        camera.refresh();
        assert!(!camera.is_changed(), "refresh is a no-op when nothing moved");
    }

    #[test]
    fn test_reset_view_matrix() {
        let mut camera = Camera::new();
        camera.look_at(Vec3::new(4.0, 4.0, 4.0), Vec3::ZERO, Vec3::Y);
        camera.reset_view_matrix();
        assert_eq!(camera.forward(), -Vec3::Z);
        assert_eq!(camera.origin(), Vec3::ZERO);
        assert!(camera.view_matrix().approx_eq(&Matrix4::IDENTITY, EPS));
    }

    #[test]
    fn test_perspective_projection_coefficients() {
        let (near, far) = (0.1, 100.0);
        let camera = Camera::perspective(45.0, 4.0 / 3.0, near, far);
        let p = camera.projection_matrix();
        assert!((p[10] - (-(far + near) / (far - near))).abs() < EPS);
        assert!((p[14] - (-2.0 * far * near / (far - near))).abs() < EPS);
        assert_eq!(p[11], -1.0);
        assert_eq!(p[15], 0.0);
    }

    #[test]
    #[should_panic(expected = "0 < near < far")]
    fn test_perspective_rejects_inverted_planes() {
        Camera::perspective(45.0, 1.0, 10.0, 1.0);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut camera = Camera::perspective(60.0, 1.0, 0.1, 10.0);
        camera.mark_uploaded();
        camera.resize_projection(1920, 1080);
        assert!(camera.is_changed());
        assert_eq!(
            *camera.projection_matrix(),
            Matrix4::perspective(60.0, 1920.0 / 1080.0, 0.1, 10.0)
        );

        camera.mark_uploaded();
        camera.resize_projection(0, 1080);
        assert!(!camera.is_changed());
    }

    #[test]
    fn test_orthographic_camera() {
        let camera = Camera::orthographic(-2.0, 2.0, -1.0, 1.0, 0.1, 10.0);
        let p = camera.projection_matrix();
        assert!((p[0] - 0.5).abs() < EPS);
        assert!((p[5] - 1.0).abs() < EPS);
        assert_eq!(p[15], 1.0);
    }
}
