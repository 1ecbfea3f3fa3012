//! Per-tick photon motion
//!
//! Inside the sphere a photon keeps its heading between ticks and only picks a
//! new one with probability [`DIRECTION_CHANGE_PROBABILITY`], which gives a
//! smoother walk than resampling every tick. The first tick at or past the
//! surface snaps it onto the surface and points it radially outward; from then
//! on it flies straight at [`OUTSIDE_SPEED_FACTOR`].
//!
//! [`step`] draws the random numbers and hands them to [`advance`], which is
//! a pure function of its inputs.

use crate::constants::*;
use crate::photon::Photon;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// The slice of the user settings the motion model reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkParams {
    /// Base speed multiplier for both phases
    pub photon_speed: f32,
    /// Magnitude of a freshly sampled inside heading
    pub step_distance: f32,
}

/// Random unit vector from spherical angles
///
/// theta ~ U[0, 2pi), phi ~ U[0, pi).
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta: f32 = rng.random_range(0.0..TAU);
    let phi: f32 = rng.random_range(0.0..PI);
    Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
}

/// Advance a photon by one tick, drawing its random heading change from `rng`
pub fn step<R: Rng + ?Sized>(photon: &Photon, params: WalkParams, dt: f32, rng: &mut R) -> Photon {
    let new_heading = if !photon.is_outside && rng.random_bool(DIRECTION_CHANGE_PROBABILITY) {
        Some(random_direction(rng))
    } else {
        None
    };

    advance(photon, params, dt, new_heading)
}

/// Advance a photon by one tick.
///
/// `new_heading` is the unit direction to turn to this tick, if any. It is
/// ignored once the photon is outside.
pub fn advance(photon: &Photon, params: WalkParams, dt: f32, new_heading: Option<Vec3>) -> Photon {
    let mut next = photon.clone();

    // Seed a visible segment right after spawn
    if next.path.len() < 2 {
        next.path.push(next.position);
    }

    if next.is_outside {
        next.position += next.velocity * params.photon_speed * dt * OUTSIDE_SPEED_FACTOR;
        next.distance_from_center = next.position.length();
    } else {
        if let Some(heading) = new_heading {
            next.velocity = heading * params.step_distance;
        }

        next.position += next.velocity * params.photon_speed * dt * INSIDE_SPEED_FACTOR;
        next.distance_from_center = next.position.length();

        if next.distance_from_center >= SPHERE_RADIUS {
            cross_boundary(&mut next);
        }
    }

    record_position(&mut next.path, next.position);
    next
}

/// Snap a photon onto the sphere surface and send it radially outward
fn cross_boundary(photon: &mut Photon) {
    let direction = photon.position.normalize_or(Vec3::X);

    photon.position = direction * SPHERE_RADIUS;
    photon.distance_from_center = SPHERE_RADIUS;
    photon.velocity = direction * ESCAPE_SPEED;
    photon.is_outside = true;
}

/// Append `position` unless it is within [`PATH_DECIMATION`] of the last point
fn record_position(path: &mut Vec<Vec3>, position: Vec3) {
    match path.last() {
        Some(last) if last.distance(position) <= PATH_DECIMATION => {}
        _ => path.push(position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const PARAMS: WalkParams = WalkParams {
        photon_speed: 1.0,
        step_distance: 0.5,
    };

    #[test]
    fn test_random_direction_is_unit() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let d = random_direction(&mut rng);
            assert!((d.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_inside_keeps_heading_without_resample() {
        let photon = Photon::new(0, Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0));
        let next = advance(&photon, PARAMS, 0.5, None);

        assert_eq!(next.velocity, photon.velocity);
        assert!((next.position - Vec3::new(0.1, 0.0, 0.0)).length() < 1e-6);
        assert!((next.distance_from_center - 0.1).abs() < 1e-6);
        assert!(!next.is_outside);
    }

    #[test]
    fn test_resample_scales_by_step_distance() {
        let photon = Photon::new(0, Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0));
        let next = advance(&photon, PARAMS, 0.0, Some(Vec3::Y));

        assert_eq!(next.velocity, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(next.position, Vec3::ZERO);
    }

    #[test]
    fn test_crossing_snaps_to_surface() {
        // 3.4 + 0.1 * 1.0 * 1.0 * 2.0 = 3.6, past the surface
        let photon = Photon::new(0, Vec3::new(3.4, 0.0, 0.0), Vec3::new(0.1, 0.0, 0.0));
        let next = advance(&photon, PARAMS, 1.0, None);

        assert!(next.is_outside);
        assert_eq!(next.distance_from_center, SPHERE_RADIUS);
        assert!((next.position - Vec3::new(SPHERE_RADIUS, 0.0, 0.0)).length() < 1e-6);
        assert!((next.velocity - Vec3::new(ESCAPE_SPEED, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_escape_velocity_ignores_prior_heading() {
        // Crosses diagonally while heading mostly sideways
        let start = Vec3::new(2.4, 2.4, 0.0);
        let photon = Photon::new(0, start, Vec3::new(0.0, 0.3, 0.0));
        let next = advance(&photon, PARAMS, 1.0, None);

        assert!(next.is_outside);
        let radial = next.position.normalize();
        assert!((next.velocity - radial * ESCAPE_SPEED).length() < 1e-6);
    }

    #[test]
    fn test_outside_moves_faster_and_straight() {
        let mut photon = Photon::new(0, Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0));
        photon.is_outside = true;

        let next = advance(&photon, PARAMS, 0.1, Some(Vec3::Y));

        // 0.5 * 1.0 * 0.1 * 6.0 = 0.3; the heading argument is ignored
        assert_eq!(next.velocity, photon.velocity);
        assert!((next.position.x - 4.3).abs() < 1e-5);
        assert!((next.distance_from_center - 4.3).abs() < 1e-5);
    }

    #[test]
    fn test_outside_never_returns_inside() {
        let mut photon = Photon::new(0, Vec3::new(3.6, 0.0, 0.0), Vec3::new(-0.5, 0.0, 0.0));
        photon.is_outside = true;

        // Pointing inward on purpose: the phase flag still must not revert
        let next = advance(&photon, PARAMS, 1.0, None);
        assert!(next.is_outside);
    }

    #[test]
    fn test_small_moves_are_decimated() {
        let photon = Photon::new(0, Vec3::ZERO, Vec3::new(0.01, 0.0, 0.0));
        let next = advance(&photon, PARAMS, 1.0, None);

        assert_eq!(next.path.len(), 2);
    }

    #[test]
    fn test_large_moves_are_recorded() {
        let photon = Photon::new(0, Vec3::ZERO, Vec3::new(0.2, 0.0, 0.0));
        let next = advance(&photon, PARAMS, 1.0, None);

        assert_eq!(next.path.len(), 3);
        assert_eq!(*next.path.last().unwrap(), next.position);
    }

    #[test]
    fn test_short_path_is_seeded() {
        let mut photon = Photon::new(0, Vec3::ZERO, Vec3::ZERO);
        photon.path.clear();

        let next = advance(&photon, PARAMS, 1.0, None);
        assert_eq!(next.path, vec![Vec3::ZERO]);

        let next = advance(&next, PARAMS, 1.0, None);
        assert_eq!(next.path.len(), 2);
    }

    #[test]
    fn test_random_walk_escapes_and_stays_out() {
        let mut rng = StdRng::seed_from_u64(42);
        let params = WalkParams {
            photon_speed: 2.0,
            step_distance: 1.0,
        };
        let mut photon = Photon::new(0, Vec3::ZERO, Vec3::new(0.05, 0.0, 0.0));
        let mut was_outside = false;

        for _ in 0..20_000 {
            let len_before = photon.path.len();
            photon = step(&photon, params, 1.0 / 60.0, &mut rng);

            assert!(photon.path.len() >= len_before);
            assert!(photon.path.len() >= 2);
            if was_outside {
                assert!(photon.is_outside);
            }
            if !photon.is_outside {
                assert!(photon.distance_from_center < SPHERE_RADIUS);
            }
            was_outside = photon.is_outside;
            if photon.has_escaped() {
                break;
            }
        }

        assert!(photon.is_outside);
    }
}
