//! # Photon Physics
//!
//! Motion model for photons scattering inside a sphere: a persistent random walk
//! while inside, straight-line escape once the boundary is crossed, and the
//! distance-based color ramp shared by every consumer of photon paths.

pub mod color;
pub mod constants;
pub mod photon;
pub mod walk;

pub use color::*;
pub use constants::*;
pub use photon::*;
pub use walk::*;
