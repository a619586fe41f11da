//! Surface resources referenced by meshes.

pub mod material;

pub use material::{ColorMaterial, ImageMaterial, Material, MaterialId, MaterialLibrary, MaterialProperties};
