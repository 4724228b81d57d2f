//! Viewer-relative orientation math
//!
//! Yaw keeps the placed panel facing the viewer from any horizontal angle;
//! the approach tilt pitches it toward the viewer at close range.

use glam::Vec3;

use crate::config::PlacementConfig;

/// Yaw angle (rotation about +Y) that turns the anchor toward the viewer.
///
/// The anchor-to-viewer direction is projected onto the ground plane and
/// normalized; the yaw is `atan2` of its horizontal components. Returns
/// `None` when the viewer is (almost) directly above the anchor, where the
/// horizontal direction is degenerate and the previous yaw should be kept.
pub fn facing_yaw(viewer: Vec3, anchor: Vec3) -> Option<f32> {
    let mut dir = viewer - anchor;
    dir.y = 0.0;
    if dir.length_squared() < 1e-8 {
        return None;
    }
    let dir = dir.normalize();
    Some(dir.x.atan2(dir.z))
}

/// Forward tilt of the video plane for the given viewer distance.
///
/// The distance is clamped into `[min_distance, max_distance]` and mapped
/// linearly so that the minimum distance yields `max_tilt` and the maximum
/// yields zero. The result is clamped again into `[0, max_tilt]`; the two
/// clamps use different bound pairs and are kept separate on purpose.
pub fn approach_tilt(distance: f32, config: &PlacementConfig) -> f32 {
    let clamped = distance.clamp(config.min_distance, config.max_distance);
    let normalized =
        (config.max_distance - clamped) / (config.max_distance - config.min_distance);
    let tilt = normalized * config.max_tilt;
    tilt.clamp(0.0, config.max_tilt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_facing_yaw_quadrants() {
        let anchor = Vec3::ZERO;

        // Viewer on +Z: panel already faces it, yaw 0
        assert_relative_eq!(
            facing_yaw(Vec3::new(0.0, 1.6, 3.0), anchor).unwrap(),
            0.0
        );
        // Viewer on +X
        assert_relative_eq!(
            facing_yaw(Vec3::new(3.0, 1.6, 0.0), anchor).unwrap(),
            FRAC_PI_2
        );
        // Viewer on -Z (behind)
        assert_relative_eq!(
            facing_yaw(Vec3::new(0.0, 1.6, -3.0), anchor).unwrap().abs(),
            PI
        );
    }

    #[test]
    fn test_facing_yaw_ignores_height() {
        let low = facing_yaw(Vec3::new(1.0, 0.1, 2.0), Vec3::ZERO).unwrap();
        let high = facing_yaw(Vec3::new(1.0, 10.0, 2.0), Vec3::ZERO).unwrap();
        assert_relative_eq!(low, high);
    }

    #[test]
    fn test_facing_yaw_degenerate_overhead() {
        assert!(facing_yaw(Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO).is_none());
    }

    #[test]
    fn test_tilt_boundaries() {
        let config = PlacementConfig::default();

        // At or inside the minimum distance: full tilt
        assert_relative_eq!(approach_tilt(0.5, &config), config.max_tilt);
        assert_relative_eq!(approach_tilt(0.1, &config), config.max_tilt);

        // At or beyond the maximum distance: no tilt
        assert_relative_eq!(approach_tilt(5.0, &config), 0.0);
        assert_relative_eq!(approach_tilt(12.0, &config), 0.0);
    }

    #[test]
    fn test_tilt_monotone_nonincreasing() {
        let config = PlacementConfig::default();
        let mut prev = approach_tilt(0.5, &config);
        let mut d = 0.5;
        while d <= 5.0 {
            let tilt = approach_tilt(d, &config);
            assert!(tilt <= prev + 1e-6, "tilt increased at distance {}", d);
            assert!((0.0..=config.max_tilt).contains(&tilt));
            prev = tilt;
            d += 0.05;
        }
    }

    #[test]
    fn test_tilt_midpoint() {
        let config = PlacementConfig::default();
        // Halfway through the band the tilt is half of max
        let mid = (config.min_distance + config.max_distance) / 2.0;
        assert_relative_eq!(approach_tilt(mid, &config), config.max_tilt / 2.0);
    }
}
