//! User-tunable settings, replaced wholesale between frames

use photon_physics::WalkParams;
use std::ops::RangeInclusive;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    /// Scene rotation about the vertical axis, radians per second (renderer only)
    pub rotation_speed: f32,
    /// Opacity of the sphere shell
    pub sphere_transparency: f32,
    /// Base speed multiplier
    pub photon_speed: f32,
    /// Step magnitude of the inside random walk
    pub step_distance: f32,
    /// Size of a photon head in pixels (renderer only)
    pub photon_size: f32,
}

impl Settings {
    // Ranges the control surface enforces. The simulation itself accepts any value.
    pub const ROTATION_SPEED_RANGE: RangeInclusive<f32> = 0.0..=8.0;
    pub const SPHERE_TRANSPARENCY_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const PHOTON_SPEED_RANGE: RangeInclusive<f32> = 0.1..=10.8;
    pub const STEP_DISTANCE_RANGE: RangeInclusive<f32> = 0.05..=3.2;
    pub const PHOTON_SIZE_RANGE: RangeInclusive<f32> = 1.0..=12.0;

    /// The motion parameters handed to the step function
    pub fn walk_params(&self) -> WalkParams {
        WalkParams {
            photon_speed: self.photon_speed,
            step_distance: self.step_distance,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rotation_speed: 0.5,
            sphere_transparency: 0.25,
            photon_speed: 1.0,
            step_distance: 0.5,
            photon_size: 4.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_within_documented_ranges() {
        let s = Settings::default();
        assert!(Settings::ROTATION_SPEED_RANGE.contains(&s.rotation_speed));
        assert!(Settings::SPHERE_TRANSPARENCY_RANGE.contains(&s.sphere_transparency));
        assert!(Settings::PHOTON_SPEED_RANGE.contains(&s.photon_speed));
        assert!(Settings::STEP_DISTANCE_RANGE.contains(&s.step_distance));
        assert!(Settings::PHOTON_SIZE_RANGE.contains(&s.photon_size));
    }

    #[test]
    fn test_walk_params_copies_motion_fields() {
        let s = Settings {
            photon_speed: 3.0,
            step_distance: 0.25,
            ..Default::default()
        };
        let p = s.walk_params();
        assert_eq!(p.photon_speed, 3.0);
        assert_eq!(p.step_distance, 0.25);
    }
}
