//! Distance-based color ramp for photon paths
//!
//! Live paths, retired trails and exported tubes all color a segment by the
//! distance of its starting point from the origin, through [`color_at`].

use crate::constants::{FADE_LENGTH, FAR_COLOR, MIN_OPACITY, NEAR_COLOR, SPHERE_RADIUS};
use glam::Vec3;

/// Color and opacity of one path segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentColor {
    /// Linear RGB
    pub color: Vec3,
    pub opacity: f32,
}

impl SegmentColor {
    /// RGBA packed for vertex buffers
    pub fn to_rgba(self) -> [f32; 4] {
        [self.color.x, self.color.y, self.color.z, self.opacity]
    }
}

/// Map a point to its color and opacity.
///
/// Inside the sphere the color ramps linearly from [`NEAR_COLOR`] at the center
/// to [`FAR_COLOR`] at the surface, fully opaque. Outside it stays at
/// [`FAR_COLOR`] and fades exponentially with distance past the surface, never
/// dropping below [`MIN_OPACITY`].
pub fn color_at(point: Vec3) -> SegmentColor {
    let d = point.length();
    let near = Vec3::from_array(NEAR_COLOR);
    let far = Vec3::from_array(FAR_COLOR);

    if d <= SPHERE_RADIUS {
        let t = d / SPHERE_RADIUS;
        // Written out (rather than lerp) so t == 1 yields FAR_COLOR exactly
        SegmentColor {
            color: near * (1.0 - t) + far * t,
            opacity: 1.0,
        }
    } else {
        SegmentColor {
            color: far,
            opacity: (-(d - SPHERE_RADIUS) / FADE_LENGTH).exp().max(MIN_OPACITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_near_color() {
        let c = color_at(Vec3::ZERO);
        assert_eq!(c.color, Vec3::from_array(NEAR_COLOR));
        assert_eq!(c.opacity, 1.0);
    }

    #[test]
    fn test_surface_is_far_color() {
        let c = color_at(Vec3::new(0.0, SPHERE_RADIUS, 0.0));
        assert_eq!(c.color, Vec3::from_array(FAR_COLOR));
        assert_eq!(c.opacity, 1.0);
    }

    #[test]
    fn test_continuous_at_boundary() {
        let inside = color_at(Vec3::new(SPHERE_RADIUS - 1e-4, 0.0, 0.0));
        let outside = color_at(Vec3::new(SPHERE_RADIUS + 1e-4, 0.0, 0.0));

        assert!((inside.color - outside.color).length() < 1e-3);
        assert!(outside.opacity <= 1.0);
        assert!(outside.opacity > 0.99);
    }

    #[test]
    fn test_halfway_blends() {
        let c = color_at(Vec3::new(0.0, 0.0, SPHERE_RADIUS * 0.5));
        let expected = (Vec3::from_array(NEAR_COLOR) + Vec3::from_array(FAR_COLOR)) * 0.5;
        assert!((c.color - expected).length() < 1e-5);
    }

    #[test]
    fn test_fades_outside() {
        let c = color_at(Vec3::new(SPHERE_RADIUS + FADE_LENGTH, 0.0, 0.0));
        assert!((c.opacity - (-1.0f32).exp()).abs() < 1e-5);
        assert_eq!(c.color, Vec3::from_array(FAR_COLOR));
    }

    #[test]
    fn test_opacity_floor() {
        let c = color_at(Vec3::new(1000.0, 0.0, 0.0));
        assert_eq!(c.opacity, MIN_OPACITY);
    }

    #[test]
    fn test_opacity_never_increases_with_distance() {
        let mut last = f32::INFINITY;
        for i in 0..100 {
            let c = color_at(Vec3::new(i as f32 * 0.5, 0.0, 0.0));
            assert!(c.opacity <= last);
            last = c.opacity;
        }
    }
}
