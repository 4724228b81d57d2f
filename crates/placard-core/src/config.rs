//! Placement and camera configuration

use serde::{Deserialize, Serialize};

/// Camera projection parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip plane in scene meters
    pub near_plane: f32,
    /// Far clip plane in scene meters
    pub far_plane: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            near_plane: 0.01,
            far_plane: 20.0,
        }
    }
}

/// Placement behavior configuration
///
/// Distances are scene meters, angles radians. The tilt band maps viewer
/// distance onto a forward pitch of the video plane: at `min_distance` or
/// closer the plane tilts by `max_tilt`, at `max_distance` or farther it
/// stands upright.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Uniform scale applied to the video plane when placement is committed
    pub scale: f32,
    /// Distance at which the approach tilt reaches its maximum
    pub min_distance: f32,
    /// Distance at or beyond which the approach tilt is zero
    pub max_distance: f32,
    /// Maximum forward tilt of the video plane
    pub max_tilt: f32,
    /// Plane size (width, height) used until the video reports its aspect
    pub default_plane_size: [f32; 2],
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            min_distance: 0.5,
            max_distance: 5.0,
            max_tilt: std::f32::consts::PI / 12.0,
            default_plane_size: [0.6, 0.5],
        }
    }
}

impl PlacementConfig {
    /// Configuration with a non-default placement scale
    pub fn with_scale(scale: f32) -> Self {
        Self {
            scale,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_placement_defaults() {
        let config = PlacementConfig::default();
        assert_relative_eq!(config.scale, 1.0);
        assert_relative_eq!(config.min_distance, 0.5);
        assert_relative_eq!(config.max_distance, 5.0);
        assert_relative_eq!(config.max_tilt, 15.0_f32.to_radians(), epsilon = 1e-6);
        assert_eq!(config.default_plane_size, [0.6, 0.5]);
    }

    #[test]
    fn test_with_scale_keeps_the_rest() {
        let config = PlacementConfig::with_scale(2.0);
        assert_relative_eq!(config.scale, 2.0);
        assert_relative_eq!(config.max_distance, PlacementConfig::default().max_distance);
    }

    #[test]
    fn test_camera_defaults() {
        let config = CameraConfig::default();
        assert_relative_eq!(config.fov_degrees, 70.0);
        assert_relative_eq!(config.near_plane, 0.01);
        assert_relative_eq!(config.far_plane, 20.0);
    }
}
