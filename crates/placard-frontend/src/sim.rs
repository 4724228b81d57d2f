//! Simulated AR backend
//!
//! Stands in for a real AR runtime on the desktop: surfaces are hit-tested
//! by intersecting the pointer ray with the ground plane, and the viewer
//! pose comes from an orbitable preview camera. Source acquisition is
//! deliberately deferred by one poll to model asynchronous resolution.

use glam::{Mat4, Quat, Vec3};

use placard_core::{ArRuntime, FrameInput, HitTestHandle, Pose};

/// A pick ray in world space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

/// Desktop stand-in for an AR session runtime
pub struct SimRuntime {
    /// Polls remaining until the pending acquisition resolves
    pending: Option<u32>,
    active: Option<HitTestHandle>,
    pointer_ray: Option<Ray>,
    azimuth: f32,
    pitch: f32,
    distance: f32,
}

impl SimRuntime {
    pub fn new() -> Self {
        Self {
            pending: None,
            active: None,
            pointer_ray: None,
            azimuth: 0.0,
            pitch: 0.45,
            distance: 2.5,
        }
    }

    /// Rotate the preview camera by a drag delta
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.azimuth -= dx * 0.01;
        self.pitch = (self.pitch + dy * 0.01).clamp(0.05, 1.5);
    }

    /// Dolly the preview camera by a scroll delta
    pub fn zoom(&mut self, scroll: f32) {
        self.distance = (self.distance * (1.0 - scroll * 0.002)).clamp(0.3, 12.0);
    }

    pub fn set_pointer_ray(&mut self, ray: Option<Ray>) {
        self.pointer_ray = ray;
    }

    /// Viewer (preview camera) pose for the current frame
    pub fn viewer_pose(&self) -> Pose {
        let eye = Vec3::new(
            self.distance * self.pitch.cos() * self.azimuth.sin(),
            self.distance * self.pitch.sin(),
            self.distance * self.pitch.cos() * self.azimuth.cos(),
        );
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        Pose::new(eye, Quat::from_mat4(&view.inverse()))
    }
}

impl Default for SimRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ArRuntime for SimRuntime {
    fn supports_hit_test(&self) -> bool {
        true
    }

    fn request_hit_test_source(&mut self) {
        if self.pending.is_none() {
            // Resolution lands on a later poll, like a real runtime
            self.pending = Some(1);
        }
    }

    fn poll_hit_test_source(&mut self) -> Option<HitTestHandle> {
        match self.pending {
            Some(0) => {
                self.pending = None;
                let handle = HitTestHandle::new();
                self.active = Some(handle);
                tracing::debug!(?handle, "hit-test source resolved");
                Some(handle)
            }
            Some(n) => {
                self.pending = Some(n - 1);
                None
            }
            None => None,
        }
    }

    fn cancel_hit_test_source(&mut self, handle: HitTestHandle) {
        if self.active == Some(handle) {
            self.active = None;
            tracing::debug!(?handle, "hit-test source cancelled");
        }
    }

    fn sample_frame(&mut self, source: Option<HitTestHandle>) -> FrameInput {
        let mut hits = Vec::new();
        if source.is_some() && source == self.active {
            if let Some(ray) = &self.pointer_ray
                && let Some(point) = intersect_ground(ray)
            {
                hits.push(Pose::from_position(point));
            }
        }
        FrameInput {
            hits,
            viewer: Some(self.viewer_pose()),
        }
    }
}

/// Intersection of a ray with the ground plane (y = 0), in front of the origin
fn intersect_ground(ray: &Ray) -> Option<Vec3> {
    if ray.dir.y.abs() < 1e-6 {
        return None;
    }
    let t = -ray.origin.y / ray.dir.y;
    if t <= 0.0 {
        return None;
    }
    Some(ray.origin + ray.dir * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_ray() -> Ray {
        Ray {
            origin: Vec3::new(1.0, 2.0, -3.0),
            dir: Vec3::NEG_Y,
        }
    }

    #[test]
    fn test_source_resolution_is_deferred() {
        let mut runtime = SimRuntime::new();
        runtime.request_hit_test_source();
        // Not resolved on the same poll
        assert!(runtime.poll_hit_test_source().is_none());
        assert!(runtime.poll_hit_test_source().is_some());
        // Nothing further pending
        assert!(runtime.poll_hit_test_source().is_none());
    }

    #[test]
    fn test_no_hits_without_source() {
        let mut runtime = SimRuntime::new();
        runtime.set_pointer_ray(Some(down_ray()));
        let input = runtime.sample_frame(None);
        assert!(input.hits.is_empty());
        assert!(input.viewer.is_some());
    }

    #[test]
    fn test_ground_hit_under_pointer() {
        let mut runtime = SimRuntime::new();
        runtime.request_hit_test_source();
        runtime.poll_hit_test_source();
        let handle = runtime.poll_hit_test_source().unwrap();

        runtime.set_pointer_ray(Some(down_ray()));
        let input = runtime.sample_frame(Some(handle));
        assert_eq!(input.hits.len(), 1);
        assert_eq!(input.hits[0].position, Vec3::new(1.0, 0.0, -3.0));
    }

    #[test]
    fn test_no_hit_pointing_at_the_sky() {
        let mut runtime = SimRuntime::new();
        runtime.request_hit_test_source();
        runtime.poll_hit_test_source();
        let handle = runtime.poll_hit_test_source().unwrap();

        runtime.set_pointer_ray(Some(Ray {
            origin: Vec3::new(0.0, 1.0, 0.0),
            dir: Vec3::Y,
        }));
        let input = runtime.sample_frame(Some(handle));
        assert!(input.hits.is_empty());
    }

    #[test]
    fn test_cancelled_source_stops_hitting() {
        let mut runtime = SimRuntime::new();
        runtime.request_hit_test_source();
        runtime.poll_hit_test_source();
        let handle = runtime.poll_hit_test_source().unwrap();
        runtime.set_pointer_ray(Some(down_ray()));

        runtime.cancel_hit_test_source(handle);
        let input = runtime.sample_frame(Some(handle));
        assert!(input.hits.is_empty());
    }
}
