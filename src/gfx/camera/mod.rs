pub mod camera;
pub mod projection;

// Re-export main types
pub use camera::Camera;
pub use projection::Projection;
