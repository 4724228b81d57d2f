//! Pose type definition

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Pose (position and orientation)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Straight-line distance to another pose
    pub fn distance_to(&self, other: &Pose) -> f32 {
        self.position.distance(other.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_to_mat4_composes_rotation_then_translation() {
        let pose = Pose::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        // Local +Z ends up on world +X, then the translation applies
        let p = pose.to_mat4().transform_point3(Vec3::Z);
        assert_relative_eq!(p.x, 2.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_distance_ignores_rotation() {
        let a = Pose::from_position(Vec3::ZERO);
        let b = Pose::new(Vec3::new(3.0, 4.0, 0.0), Quat::from_rotation_x(1.0));
        assert_relative_eq!(a.distance_to(&b), 5.0);
    }
}
