//! Photon and trail records

use crate::constants::{ESCAPE_CUTOFF, SPAWN_VELOCITY_SPREAD};
use glam::Vec3;
use rand::Rng;

/// Identifier handed out by the population manager, never reused
pub type PhotonId = u64;

/// A photon currently being advanced by the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Photon {
    pub id: PhotonId,
    /// Current location
    pub position: Vec3,
    /// Step vector while inside, radial escape velocity once outside
    pub velocity: Vec3,
    /// Recorded positions, oldest first. Only ever appended to.
    pub path: Vec<Vec3>,
    /// Set once the photon crosses the sphere surface; never cleared
    pub is_outside: bool,
    /// Cached `position.length()`, refreshed every step
    pub distance_from_center: f32,
}

impl Photon {
    /// Create a photon with a two-point seed path at `position`
    pub fn new(id: PhotonId, position: Vec3, velocity: Vec3) -> Self {
        Self {
            id,
            position,
            velocity,
            path: vec![position, position],
            is_outside: false,
            distance_from_center: position.length(),
        }
    }

    /// Spawn a photon at the origin with a small random velocity
    pub fn spawn<R: Rng + ?Sized>(id: PhotonId, rng: &mut R) -> Self {
        let spread = SPAWN_VELOCITY_SPREAD;
        let velocity = Vec3::new(
            rng.random_range(-spread..spread),
            rng.random_range(-spread..spread),
            rng.random_range(-spread..spread),
        );
        Self::new(id, Vec3::ZERO, velocity)
    }

    /// True once the photon is far enough out to be retired
    pub fn has_escaped(&self) -> bool {
        self.distance_from_center >= ESCAPE_CUTOFF
    }
}

/// Frozen path of a retired photon
///
/// Always holds at least two points so it can be drawn as a line. There is no
/// way to mutate a trail after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    id: PhotonId,
    path: Box<[Vec3]>,
}

impl Trail {
    /// Freeze a photon's path, padding it to two points if needed
    pub fn from_photon(photon: &Photon) -> Self {
        let path: Vec<Vec3> = match photon.path.as_slice() {
            [] => vec![photon.position, photon.position],
            [only] => vec![*only, *only],
            points => points.to_vec(),
        };

        Self {
            id: photon.id,
            path: path.into_boxed_slice(),
        }
    }

    pub fn id(&self) -> PhotonId {
        self.id
    }

    pub fn path(&self) -> &[Vec3] {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_at_origin_with_seed_path() {
        let mut rng = StdRng::seed_from_u64(7);
        let photon = Photon::spawn(3, &mut rng);

        assert_eq!(photon.id, 3);
        assert_eq!(photon.position, Vec3::ZERO);
        assert_eq!(photon.path, vec![Vec3::ZERO, Vec3::ZERO]);
        assert!(!photon.is_outside);
        assert_eq!(photon.distance_from_center, 0.0);
        assert!(photon.velocity.abs().max_element() <= SPAWN_VELOCITY_SPREAD);
    }

    #[test]
    fn test_has_escaped_at_cutoff() {
        let photon = Photon::new(0, Vec3::new(ESCAPE_CUTOFF, 0.0, 0.0), Vec3::ZERO);
        assert!(photon.has_escaped());

        let photon = Photon::new(0, Vec3::new(ESCAPE_CUTOFF - 0.01, 0.0, 0.0), Vec3::ZERO);
        assert!(!photon.has_escaped());
    }

    #[test]
    fn test_trail_copies_path() {
        let mut photon = Photon::new(9, Vec3::ZERO, Vec3::ZERO);
        photon.path.push(Vec3::X);
        let trail = Trail::from_photon(&photon);

        assert_eq!(trail.id(), 9);
        assert_eq!(trail.path(), &[Vec3::ZERO, Vec3::ZERO, Vec3::X]);
    }

    #[test]
    fn test_trail_pads_single_point() {
        let mut photon = Photon::new(1, Vec3::ZERO, Vec3::ZERO);
        photon.path = vec![Vec3::Y];
        let trail = Trail::from_photon(&photon);

        assert_eq!(trail.path(), &[Vec3::Y, Vec3::Y]);
    }

    #[test]
    fn test_trail_synthesizes_empty_path() {
        let mut photon = Photon::new(1, Vec3::new(30.0, 0.0, 0.0), Vec3::ZERO);
        photon.path.clear();
        let trail = Trail::from_photon(&photon);

        assert_eq!(trail.path(), &[photon.position, photon.position]);
    }

    #[test]
    fn test_trail_is_detached_from_photon() {
        let mut photon = Photon::new(1, Vec3::ZERO, Vec3::ZERO);
        let trail = Trail::from_photon(&photon);
        photon.path.push(Vec3::Z);

        assert_eq!(trail.path().len(), 2);
    }
}
