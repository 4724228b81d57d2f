//! Perspective camera and its GPU uniform

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

use placard_core::CameraConfig;

/// Camera uniform data - uploaded once per frame
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            eye: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Perspective camera driven by the tracked viewer pose
#[derive(Debug, Clone)]
pub struct Camera {
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    position: Vec3,
    rotation: Quat,
}

impl Camera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            fov_y: config.fov_degrees.to_radians(),
            aspect,
            near: config.near_plane,
            far: config.far_plane,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    /// Update the aspect ratio (viewport resize)
    pub fn update_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Follow the viewer pose for this frame
    pub fn set_pose(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
            eye: [self.position.x, self.position.y, self.position.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_update_changes_projection() {
        let mut camera = Camera::new(&CameraConfig::default(), 1.0);
        let before = camera.view_proj();
        camera.update_aspect(2.0);
        let after = camera.view_proj();
        assert_ne!(before, after);
        assert_eq!(camera.aspect(), 2.0);
    }

    #[test]
    fn test_uniform_tracks_pose() {
        let mut camera = Camera::new(&CameraConfig::default(), 16.0 / 9.0);
        camera.set_pose(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY);
        let uniform = camera.uniform();
        assert_eq!(uniform.eye, [1.0, 2.0, 3.0, 1.0]);
    }
}
