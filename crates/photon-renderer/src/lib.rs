//! # Photon Renderer
//!
//! Draws the sphere shell, photon paths, retired trails and photon heads.

pub mod camera;
pub mod error;
pub mod geometry;
pub mod renderer;

pub use camera::*;
pub use error::*;
pub use geometry::*;
pub use renderer::*;
