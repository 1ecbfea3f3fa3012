//! # Photon Export
//!
//! Turns photon paths into tube meshes and writes them, together with the
//! sphere shell, as a binary glTF (`.glb`) scene.

pub mod error;
pub mod exporter;
mod gltf;
pub mod mesh;

pub use error::*;
pub use exporter::*;
pub use mesh::Mesh;
