use crate::math::Matrix4;

/// Parameters of the camera's projection, kept so the matrix can be rebuilt
/// when the viewport changes shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Symmetric perspective; `fov` is the vertical field of view in degrees.
    Perspective {
        fov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    /// Possibly off-axis perspective given by its near-plane rectangle.
    Frustum {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    /// Builds the projection matrix.
    ///
    /// # Panics
    /// Perspective variants panic unless `0 < near < far`.
    pub fn matrix(&self) -> Matrix4 {
        match *self {
            Projection::Perspective {
                fov,
                aspect,
                near,
                far,
            } => Matrix4::perspective(fov, aspect, near, far),
            Projection::Frustum {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Matrix4::frustum(left, right, bottom, top, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Matrix4::orthographic(left, right, bottom, top, near, far),
        }
    }

    /// Adapts the projection to a new width/height ratio. Perspective
    /// projections change their aspect; frustum and orthographic volumes
    /// widen or narrow horizontally around their centre, keeping the height.
    pub fn with_aspect(self, new_aspect: f32) -> Projection {
        match self {
            Projection::Perspective {
                fov, near, far, ..
            } => Projection::Perspective {
                fov,
                aspect: new_aspect,
                near,
                far,
            },
            Projection::Frustum {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => {
                let (left, right) = refit_horizontal(left, right, bottom, top, new_aspect);
                Projection::Frustum {
                    left,
                    right,
                    bottom,
                    top,
                    near,
                    far,
                }
            }
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => {
                let (left, right) = refit_horizontal(left, right, bottom, top, new_aspect);
                Projection::Orthographic {
                    left,
                    right,
                    bottom,
                    top,
                    near,
                    far,
                }
            }
        }
    }
}

fn refit_horizontal(left: f32, right: f32, bottom: f32, top: f32, aspect: f32) -> (f32, f32) {
    let centre = (left + right) * 0.5;
    let half_width = (top - bottom) * aspect * 0.5;
    (centre - half_width, centre + half_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perspective_matrix_matches_kernel() {
        let projection = Projection::Perspective {
            fov: 45.0,
            aspect: 1.5,
            near: 0.1,
            far: 100.0,
        };
        assert_eq!(projection.matrix(), Matrix4::perspective(45.0, 1.5, 0.1, 100.0));
    }

    #[test]
    fn test_with_aspect_keeps_vertical_extent() {
        let ortho = Projection::Orthographic {
            left: -1.0,
            right: 1.0,
            bottom: -1.0,
            top: 1.0,
            near: 0.0,
            far: 10.0,
        };
        match ortho.with_aspect(2.0) {
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                ..
            } => {
                assert_eq!((left, right), (-2.0, 2.0));
                assert_eq!((bottom, top), (-1.0, 1.0));
            }
            other => panic!("variant changed: {:?}", other),
        }

        let perspective = Projection::Perspective {
            fov: 60.0,
            aspect: 1.0,
            near: 1.0,
            far: 50.0,
        };
        assert!(matches!(
            perspective.with_aspect(0.5),
            Projection::Perspective { aspect, fov, .. } if aspect == 0.5 && fov == 60.0
        ));
    }
}
