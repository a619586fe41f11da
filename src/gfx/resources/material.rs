//! Material definitions for Phong-style surfaces
//!
//! Materials come in two flavours: a plain [`ColorMaterial`] carrying
//! ambient/diffuse/specular/emissive colours, and an [`ImageMaterial`] that
//! additionally names texture maps. Meshes refer to materials by name
//! ([`MaterialId`]) and the scene resolves the name through a
//! [`MaterialLibrary`].

use crate::math::Vec3;

/// Material ID for referencing materials
pub type MaterialId = String;

/// Scalar properties shared by every material variant.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialProperties {
    pub name: String,
    /// Specular exponent (`Ns`).
    pub shininess: f32,
    /// Optical density (`Ni`).
    pub refraction_index: f32,
    /// 0.0 is opaque, 1.0 fully transparent.
    ///
    /// This is the inverse of MTL dissolve: `d 0.25` is stored as 0.75, while
    /// `Tr` is stored unchanged.
    pub transparency: f32,
    /// Illumination model number (`illum`).
    pub illumination_model: i32,
}

impl MaterialProperties {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shininess: 0.0,
            refraction_index: 1.0,
            transparency: 0.0,
            illumination_model: 0,
        }
    }
}

/// A material described only by colours.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMaterial {
    pub properties: MaterialProperties,
    pub ambient: Option<Vec3>,
    pub diffuse: Option<Vec3>,
    pub specular: Option<Vec3>,
    pub emissive: Option<Vec3>,
}

impl ColorMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            properties: MaterialProperties::new(name),
            ambient: None,
            diffuse: None,
            specular: None,
            emissive: None,
        }
    }

    pub fn with_ambient(mut self, color: impl Into<Vec3>) -> Self {
        self.ambient = Some(color.into());
        self
    }

    pub fn with_diffuse(mut self, color: impl Into<Vec3>) -> Self {
        self.diffuse = Some(color.into());
        self
    }

    pub fn with_specular(mut self, color: impl Into<Vec3>) -> Self {
        self.specular = Some(color.into());
        self
    }

    pub fn with_emissive(mut self, color: impl Into<Vec3>) -> Self {
        self.emissive = Some(color.into());
        self
    }

    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.properties.shininess = shininess;
        self
    }
}

/// A material that samples texture maps. Map values are file names as they
/// appear in the material file; loading the images is left to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMaterial {
    pub properties: MaterialProperties,
    pub ambient_map: Option<String>,
    pub diffuse_map: Option<String>,
    pub specular_map: Option<String>,
    pub specular_power_map: Option<String>,
    pub bump_map: Option<String>,
}

impl ImageMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_properties(MaterialProperties::new(name))
    }

    fn from_properties(properties: MaterialProperties) -> Self {
        Self {
            properties,
            ambient_map: None,
            diffuse_map: None,
            specular_map: None,
            specular_power_map: None,
            bump_map: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Color(ColorMaterial),
    Image(ImageMaterial),
}

impl Material {
    pub fn name(&self) -> &str {
        &self.properties().name
    }

    pub fn properties(&self) -> &MaterialProperties {
        match self {
            Material::Color(material) => &material.properties,
            Material::Image(material) => &material.properties,
        }
    }

    pub fn properties_mut(&mut self) -> &mut MaterialProperties {
        match self {
            Material::Color(material) => &mut material.properties,
            Material::Image(material) => &mut material.properties,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Material::Image(_))
    }

    /// Converts to an image material. Scalar properties carry over, colours
    /// are dropped.
    pub fn into_image(self) -> ImageMaterial {
        match self {
            Material::Color(material) => ImageMaterial::from_properties(material.properties),
            Material::Image(material) => material,
        }
    }

    /// Mutable access to the image variant, upgrading a colour material in
    /// place first if necessary.
    pub fn as_image_mut(&mut self) -> &mut ImageMaterial {
        if let Material::Color(color) = self {
            let properties = color.properties.clone();
            *self = Material::Image(ImageMaterial::from_properties(properties));
        }
        match self {
            Material::Image(image) => image,
            Material::Color(_) => unreachable!("color material was just upgraded"),
        }
    }
}

impl From<ColorMaterial> for Material {
    fn from(material: ColorMaterial) -> Self {
        Material::Color(material)
    }
}

impl From<ImageMaterial> for Material {
    fn from(material: ImageMaterial) -> Self {
        Material::Image(material)
    }
}

/// Ordered collection of materials, looked up by name.
///
/// Material files hold a handful of entries, so lookups are a linear scan and
/// the first material with a given name wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a material. Returns `false`, leaving the library unchanged, when a
    /// material with the same name is already present.
    pub fn add(&mut self, material: impl Into<Material>) -> bool {
        let material = material.into();
        if self.contains(material.name()) {
            log::warn!("Material '{}' already exists, keeping the first definition", material.name());
            return false;
        }
        self.materials.push(material);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.materials.iter_mut().find(|m| m.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The most recently added material.
    pub fn last_mut(&mut self) -> Option<&mut Material> {
        self.materials.last_mut()
    }

    /// Moves every material of `other` into this library, skipping names that
    /// are already taken.
    pub fn merge(&mut self, other: MaterialLibrary) {
        for material in other.materials {
            self.add(material);
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.materials.iter().map(Material::name).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl IntoIterator for MaterialLibrary {
    type Item = Material;
    type IntoIter = std::vec::IntoIter<Material>;

    fn into_iter(self) -> Self::IntoIter {
        self.materials.into_iter()
    }
}

impl<'a> IntoIterator for &'a MaterialLibrary {
    type Item = &'a Material;
    type IntoIter = std::slice::Iter<'a, Material>;

    fn into_iter(self) -> Self::IntoIter {
        self.materials.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_material_builder() {
        let material = ColorMaterial::new("brass")
            .with_ambient([0.3, 0.2, 0.1])
            .with_diffuse([0.8, 0.6, 0.2])
            .with_shininess(27.9);
        assert_eq!(material.properties.name, "brass");
        assert_eq!(material.diffuse, Some(Vec3::new(0.8, 0.6, 0.2)));
        assert_eq!(material.specular, None);
        assert_eq!(material.properties.shininess, 27.9);
    }

    #[test]
    fn test_into_image_keeps_scalar_properties() {
        let mut color = ColorMaterial::new("glass").with_diffuse([1.0, 1.0, 1.0]);
        color.properties.transparency = 0.7;
        color.properties.illumination_model = 4;

        let image = Material::from(color).into_image();
        assert_eq!(image.properties.name, "glass");
        assert_eq!(image.properties.transparency, 0.7);
        assert_eq!(image.properties.illumination_model, 4);
        assert!(image.diffuse_map.is_none());
    }

    #[test]
    fn test_as_image_mut_upgrades_in_place() {
        let mut material = Material::from(ColorMaterial::new("wood").with_shininess(5.0));
        material.as_image_mut().diffuse_map = Some("wood.png".to_string());

        assert!(material.is_image());
        assert_eq!(material.properties().shininess, 5.0);
        match material {
            Material::Image(image) => assert_eq!(image.diffuse_map.as_deref(), Some("wood.png")),
            Material::Color(_) => panic!("expected an image material"),
        }
    }

    #[test]
    fn test_library_lookup_and_duplicates() {
        let mut library = MaterialLibrary::new();
        assert!(library.add(ColorMaterial::new("red").with_diffuse([1.0, 0.0, 0.0])));
        assert!(library.add(ImageMaterial::new("checker")));
        assert!(!library.add(ColorMaterial::new("red").with_diffuse([0.5, 0.0, 0.0])));

        assert_eq!(library.len(), 2);
        assert_eq!(library.names(), vec!["red", "checker"]);
        match library.get("red") {
            Some(Material::Color(red)) => assert_eq!(red.diffuse, Some(Vec3::X)),
            other => panic!("unexpected lookup result: {:?}", other),
        }
        assert!(library.get("missing").is_none());
    }

    #[test]
    fn test_merge_skips_taken_names() {
        let mut first = MaterialLibrary::new();
        first.add(ColorMaterial::new("a"));
        let mut second = MaterialLibrary::new();
        second.add(ColorMaterial::new("a").with_shininess(9.0));
        second.add(ColorMaterial::new("b"));

        first.merge(second);
        assert_eq!(first.names(), vec!["a", "b"]);
        assert_eq!(first.get("a").map(|m| m.properties().shininess), Some(0.0));
    }
}
