//! Orbit camera and the per-frame scene uniform

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// Scene uniform for GPU (matches `Scene` in scene.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Scene rotation about Y
    pub model: [[f32; 4]; 4],
    /// Surface size in physical pixels
    pub viewport: [f32; 2],
    /// Photon head radius in pixels
    pub photon_size: f32,
    pub sphere_opacity: f32,
}

/// Camera orbiting the origin
pub struct Camera {
    pub distance: f32,
    pub rotation: Quat,
    pub target: Vec3,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub const DEFAULT_DISTANCE: f32 = 14.0;
    pub const MIN_DISTANCE: f32 = 4.0;
    pub const MAX_DISTANCE: f32 = 200.0;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            distance: Self::DEFAULT_DISTANCE,
            rotation: Self::default_rotation(),
            target: Vec3::ZERO,
            aspect: width as f32 / height.max(1) as f32,
            fovy: 45.0_f32.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    fn default_rotation() -> Quat {
        Quat::from_rotation_x(-0.3)
    }

    pub fn position(&self) -> Vec3 {
        let offset = self.rotation * Vec3::new(0.0, 0.0, self.distance);
        self.target + offset
    }

    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        let up = self.rotation * Vec3::Y;
        let yaw_rotation = Quat::from_axis_angle(up, delta_x);

        let right = self.rotation * Vec3::X;
        let pitch_rotation = Quat::from_axis_angle(right, -delta_y);

        self.rotation = yaw_rotation * pitch_rotation * self.rotation;
        self.rotation = self.rotation.normalize();
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    /// Back to the initial viewpoint
    pub fn reset(&mut self) {
        self.distance = Self::DEFAULT_DISTANCE;
        self.rotation = Self::default_rotation();
        self.target = Vec3::ZERO;
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        let position = self.position();
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-position);
        let view = rotation_matrix * translation_matrix;
        let proj = Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    pub fn to_uniform(
        &self,
        scene_rotation: f32,
        viewport: [f32; 2],
        photon_size: f32,
        sphere_opacity: f32,
    ) -> SceneUniform {
        SceneUniform {
            view_proj: self.build_view_projection_matrix().to_cols_array_2d(),
            model: Mat4::from_rotation_y(scene_rotation).to_cols_array_2d(),
            viewport,
            photon_size,
            sphere_opacity,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<SceneUniform>(), 144);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::new(800, 600);
        camera.zoom(-1000.0);
        assert_eq!(camera.distance, Camera::MIN_DISTANCE);
        camera.zoom(1.0e6);
        assert_eq!(camera.distance, Camera::MAX_DISTANCE);
    }

    #[test]
    fn test_rotation_keeps_distance() {
        let mut camera = Camera::new(800, 600);
        camera.rotate(0.7, -0.4);
        assert!((camera.position().length() - camera.distance).abs() < 1e-4);
    }

    #[test]
    fn test_reset_restores_view() {
        let mut camera = Camera::new(800, 600);
        let original = camera.position();
        camera.rotate(1.0, 1.0);
        camera.zoom(20.0);
        camera.reset();
        assert!((camera.position() - original).length() < 1e-5);
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let camera = Camera::new(800, 600);
        let clip = camera.build_view_projection_matrix() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
