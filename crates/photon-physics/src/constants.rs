//! Fixed constants of the photon model
//!
//! Lengths are in scene units. The values are tuned for a sphere that fills
//! roughly a fifth of the default view.

/// Radius of the scattering sphere
pub const SPHERE_RADIUS: f32 = 3.5;

/// Distance from the origin at which a photon is retired into a trail
pub const ESCAPE_CUTOFF: f32 = 25.0;

/// Probability per tick that an inside photon picks a new heading
pub const DIRECTION_CHANGE_PROBABILITY: f64 = 0.3;

/// Speed multiplier while random-walking inside the sphere
pub const INSIDE_SPEED_FACTOR: f32 = 2.0;

/// Speed multiplier after escape (3x the inside factor)
pub const OUTSIDE_SPEED_FACTOR: f32 = INSIDE_SPEED_FACTOR * 3.0;

/// Magnitude of the radial velocity assigned when a photon crosses the boundary
pub const ESCAPE_SPEED: f32 = 0.5;

/// Minimum movement before a new point is recorded in a path
pub const PATH_DECIMATION: f32 = 0.1;

/// Half-width of the per-axis range for a freshly spawned photon's velocity
pub const SPAWN_VELOCITY_SPREAD: f32 = 0.05;

/// Maximum number of live photons
pub const MAX_PHOTONS: usize = 8;

/// Trail color near the center (dark red)
pub const NEAR_COLOR: [f32; 3] = [0.545, 0.0, 0.0];

/// Trail color at and beyond the sphere surface (bright orange)
pub const FAR_COLOR: [f32; 3] = [1.0, 0.647, 0.0];

/// Length over which opacity falls by a factor of e outside the sphere
pub const FADE_LENGTH: f32 = 10.0;

/// Opacity floor so distant segments never disappear completely
pub const MIN_OPACITY: f32 = 0.1;
