//! # Photon Simulation
//!
//! Owns the live photons and their retired trails and advances them once per
//! frame.

pub mod params;
pub mod simulation;

pub use params::*;
pub use simulation::*;
