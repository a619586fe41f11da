use crate::math::Vec3;

/// Colour terms and intensity of a light source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightColor {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub power: f32,
}

impl Default for LightColor {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(1.0),
            specular: Vec3::splat(1.0),
            power: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: LightColor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels in, normalized on construction.
    pub direction: Vec3,
    pub color: LightColor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Point(PointLight),
    Directional(DirectionalLight),
}

impl Light {
    pub fn point(position: Vec3, color: LightColor) -> Self {
        Light::Point(PointLight { position, color })
    }

    /// The normalized direction is written to the program's
    /// `UniformSlot::LightDirection` uniform, `light_dir` by default.
    ///
    /// # Panics
    /// Panics if `direction` is the zero vector.
    pub fn directional(direction: Vec3, color: LightColor) -> Self {
        Light::Directional(DirectionalLight {
            direction: direction.normalized(),
            color,
        })
    }

    pub fn color(&self) -> &LightColor {
        match self {
            Light::Point(light) => &light.color,
            Light::Directional(light) => &light.color,
        }
    }

    pub fn color_mut(&mut self) -> &mut LightColor {
        match self {
            Light::Point(light) => &mut light.color,
            Light::Directional(light) => &mut light.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_light_is_normalized() {
        let light = Light::directional(Vec3::new(0.0, -2.0, 0.0), LightColor::default());
        match light {
            Light::Directional(d) => assert_eq!(d.direction, -Vec3::Y),
            Light::Point(_) => panic!("expected a directional light"),
        }
    }

    #[test]
    fn test_color_access_is_shared_across_variants() {
        let mut light = Light::point(Vec3::new(0.0, 5.0, 0.0), LightColor::default());
        light.color_mut().power = 3.0;
        assert_eq!(light.color().power, 3.0);
        assert_eq!(light.color().diffuse, Vec3::splat(1.0));
    }
}
