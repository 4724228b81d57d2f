//! Placement session state machine
//!
//! One `PlacementSession` owns all per-session state: the phase, the
//! hit-test source lifecycle, the anchor, and the visibility/transforms of
//! the three visual proxies (reticle, video plane, shadow decal). Nothing
//! here touches the GPU or any runtime; backends feed `FrameInput`s in and
//! read proxy transforms out.

use glam::{Mat4, Vec3};

use crate::config::PlacementConfig;
use crate::media::{VideoMetadata, VideoState};
use crate::orient;
use crate::pose::Pose;
use crate::runtime::{FrameInput, HitTestHandle, HitTestState};

/// Vertical offset of the shadow decal below the anchor
const SHADOW_LIFT: f32 = -0.02;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Hit-testing surfaces; placement not yet committed
    #[default]
    Searching,
    /// Video placed; viewer-relative orientation active
    Placed,
}

/// Visibility and pose of one visual proxy
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Proxy {
    pub visible: bool,
    pub pose: Pose,
}

/// The Placement Session Controller state.
///
/// Invariants, maintained by every public operation:
/// - video plane and shadow visibility are always equal
/// - the reticle is never visible while the video plane is
/// - a hit-test handle is held only while `Searching`
pub struct PlacementSession {
    config: PlacementConfig,
    phase: SessionPhase,
    hit_test: HitTestState,
    anchor: Pose,
    yaw: f32,
    tilt: f32,
    plane_scale: f32,
    reticle: Proxy,
    reticle_ready: bool,
    video_visible: bool,
    shadow_visible: bool,
    video: VideoState,
}

impl PlacementSession {
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            config,
            phase: SessionPhase::Searching,
            hit_test: HitTestState::Idle,
            anchor: Pose::IDENTITY,
            yaw: 0.0,
            tilt: 0.0,
            plane_scale: 1.0,
            reticle: Proxy::default(),
            reticle_ready: false,
            video_visible: false,
            shadow_visible: false,
            video: VideoState::default(),
        }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn hit_test(&self) -> HitTestState {
        self.hit_test
    }

    pub fn anchor(&self) -> &Pose {
        &self.anchor
    }

    pub fn reticle(&self) -> &Proxy {
        &self.reticle
    }

    pub fn reticle_ready(&self) -> bool {
        self.reticle_ready
    }

    pub fn video_visible(&self) -> bool {
        self.video_visible
    }

    pub fn shadow_visible(&self) -> bool {
        self.shadow_visible
    }

    pub fn video(&self) -> &VideoState {
        &self.video
    }

    /// Current yaw of the anchor group (video plane + shadow)
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Current forward tilt of the video plane only
    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    /// Uniform scale currently applied to the video plane
    pub fn plane_scale(&self) -> Vec3 {
        Vec3::splat(self.plane_scale)
    }

    /// The placement cursor model finished loading.
    ///
    /// Until then hit tracking is skipped: hit-testing may already succeed,
    /// but there is nothing to show and nothing to place against.
    pub fn set_reticle_ready(&mut self) {
        self.reticle_ready = true;
    }

    /// True exactly when a hit-test source acquisition should be fired.
    ///
    /// Flips the source state to `Pending`, which suppresses further
    /// requests until `attach_hit_test_source` resolves this one.
    pub fn begin_hit_test_request(&mut self) -> bool {
        if self.phase == SessionPhase::Searching && self.hit_test.is_idle() {
            self.hit_test = HitTestState::Pending;
            true
        } else {
            false
        }
    }

    /// Deliver a resolved hit-test source.
    ///
    /// Returns the handle back when it is no longer wanted (resolution
    /// arrived after placement or after reset) so the caller can cancel it;
    /// the session never holds a handle outside `Searching`.
    pub fn attach_hit_test_source(&mut self, handle: HitTestHandle) -> Option<HitTestHandle> {
        if self.phase == SessionPhase::Searching && self.hit_test == HitTestState::Pending {
            self.hit_test = HitTestState::Ready(handle);
            tracing::debug!(?handle, "hit-test source attached");
            None
        } else {
            tracing::warn!(?handle, "hit-test source resolved too late, discarding");
            Some(handle)
        }
    }

    /// Per-frame update.
    ///
    /// While `Searching` the reticle follows the first (nearest) hit, or
    /// hides when there is none; nothing happens until a source is ready
    /// and the cursor model is loaded. While `Placed` the anchor yaw and
    /// the plane tilt are recomputed from the viewer pose; a frame without
    /// one changes nothing.
    pub fn advance_frame(&mut self, input: &FrameInput) {
        match self.phase {
            SessionPhase::Searching => {
                if !self.hit_test.is_ready() || !self.reticle_ready {
                    return;
                }
                match input.hits.first() {
                    Some(hit) => {
                        self.reticle.visible = true;
                        self.reticle.pose = Pose::from_position(hit.position);
                    }
                    None => self.reticle.visible = false,
                }
            }
            SessionPhase::Placed => {
                let Some(viewer) = &input.viewer else {
                    return;
                };
                if let Some(yaw) = orient::facing_yaw(viewer.position, self.anchor.position) {
                    self.yaw = yaw;
                }
                let distance = self.anchor.distance_to(viewer);
                self.tilt = orient::approach_tilt(distance, &self.config);
            }
        }
    }

    /// The user selection gesture.
    ///
    /// A no-op unless a hit-test source exists, the cursor model is loaded,
    /// and the cursor is currently visible. On success all placement
    /// effects apply together and the released handle is returned for
    /// cancellation by the runtime.
    pub fn commit_placement(&mut self) -> Option<HitTestHandle> {
        if self.phase != SessionPhase::Searching {
            return None;
        }
        let HitTestState::Ready(handle) = self.hit_test else {
            return None;
        };
        if !self.reticle_ready || !self.reticle.visible {
            return None;
        }

        self.video.playing = true;
        self.video.at_start = false;
        self.anchor = self.reticle.pose;
        self.plane_scale = self.config.scale;
        self.video_visible = true;
        self.shadow_visible = true;
        self.reticle.visible = false;
        self.hit_test = HitTestState::Idle;
        self.phase = SessionPhase::Placed;

        tracing::info!(anchor = ?self.anchor.position, scale = self.config.scale, "placement committed");
        Some(handle)
    }

    /// Session end: back to the initial searching state.
    ///
    /// Pauses and rewinds the video, hides all proxies, and resets the
    /// anchor to identity. The hit-test source is not restored (a fresh
    /// session requests a fresh one); a handle still held is released and
    /// returned for cancellation. Idempotent.
    pub fn reset(&mut self) -> Option<HitTestHandle> {
        self.video.playing = false;
        self.video.at_start = true;
        self.video_visible = false;
        self.shadow_visible = false;
        self.anchor = Pose::IDENTITY;
        self.yaw = 0.0;
        self.tilt = 0.0;
        self.plane_scale = 1.0;
        self.reticle.visible = false;
        self.phase = SessionPhase::Searching;

        let released = std::mem::take(&mut self.hit_test).handle();
        if released.is_some() {
            tracing::debug!("session reset, releasing hit-test source");
        }
        released
    }

    /// The media reported its intrinsic dimensions.
    ///
    /// Arrives asynchronously, independent of placement timing.
    pub fn apply_video_metadata(&mut self, metadata: VideoMetadata) {
        self.video.aspect = Some(metadata.aspect());
        tracing::debug!(width = metadata.width, height = metadata.height, "video metadata applied");
    }

    /// World transform of the reticle
    pub fn reticle_transform(&self) -> Mat4 {
        self.reticle.pose.to_mat4()
    }

    /// World transform of the video plane: anchor translation, viewer yaw,
    /// forward tilt (video plane only), placement scale
    pub fn video_transform(&self) -> Mat4 {
        Mat4::from_translation(self.anchor.position)
            * Mat4::from_rotation_y(self.yaw)
            * Mat4::from_rotation_x(-self.tilt)
            * Mat4::from_scale(self.plane_scale())
    }

    /// World transform of the shadow decal: follows the anchor yaw but not
    /// the tilt, sits just below the anchor, faces up
    pub fn shadow_transform(&self) -> Mat4 {
        Mat4::from_translation(self.anchor.position)
            * Mat4::from_rotation_y(self.yaw)
            * Mat4::from_translation(Vec3::new(0.0, SHADOW_LIFT, 0.0))
            * Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ready_session(config: PlacementConfig) -> PlacementSession {
        let mut session = PlacementSession::new(config);
        session.set_reticle_ready();
        assert!(session.begin_hit_test_request());
        assert!(session.attach_hit_test_source(HitTestHandle::new()).is_none());
        session
    }

    fn hit_frame(position: Vec3) -> FrameInput {
        FrameInput {
            hits: vec![Pose::from_position(position)],
            viewer: None,
        }
    }

    fn check_invariants(session: &PlacementSession) {
        assert_eq!(session.video_visible(), session.shadow_visible());
        assert!(!(session.reticle().visible && session.video_visible()));
        if session.hit_test().is_ready() {
            assert_eq!(session.phase(), SessionPhase::Searching);
        }
    }

    #[test]
    fn test_initial_state() {
        let session = PlacementSession::new(PlacementConfig::default());
        assert_eq!(session.phase(), SessionPhase::Searching);
        assert!(session.hit_test().is_idle());
        assert!(!session.video().playing);
        assert!(!session.video_visible());
        assert!(!session.shadow_visible());
        assert!(!session.reticle().visible);
        check_invariants(&session);
    }

    #[test]
    fn test_request_suppressed_while_pending() {
        let mut session = PlacementSession::new(PlacementConfig::default());
        assert!(session.begin_hit_test_request());
        // In flight: no duplicate request
        assert!(!session.begin_hit_test_request());
        assert!(session.attach_hit_test_source(HitTestHandle::new()).is_none());
        // Resolved: still no new request
        assert!(!session.begin_hit_test_request());
    }

    #[test]
    fn test_reticle_hidden_without_hits() {
        let mut session = ready_session(PlacementConfig::default());
        session.advance_frame(&hit_frame(Vec3::new(0.0, 0.0, -1.0)));
        assert!(session.reticle().visible);

        session.advance_frame(&FrameInput::empty());
        assert!(!session.reticle().visible);
    }

    #[test]
    fn test_reticle_tracks_first_hit() {
        let mut session = ready_session(PlacementConfig::default());
        let input = FrameInput {
            hits: vec![
                Pose::from_position(Vec3::new(1.0, 0.0, -2.0)),
                Pose::from_position(Vec3::new(4.0, 0.0, -9.0)),
            ],
            viewer: None,
        };
        session.advance_frame(&input);
        assert!(session.reticle().visible);
        assert_eq!(session.reticle().pose.position, Vec3::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn test_no_tracking_before_source_or_cursor() {
        // Source pending, cursor loaded: nothing happens
        let mut session = PlacementSession::new(PlacementConfig::default());
        session.set_reticle_ready();
        session.begin_hit_test_request();
        session.advance_frame(&hit_frame(Vec3::ZERO));
        assert!(!session.reticle().visible);

        // Source ready, cursor still loading: nothing happens either
        let mut session = PlacementSession::new(PlacementConfig::default());
        session.begin_hit_test_request();
        session.attach_hit_test_source(HitTestHandle::new());
        session.advance_frame(&hit_frame(Vec3::ZERO));
        assert!(!session.reticle().visible);
    }

    #[test]
    fn test_select_requires_all_guards() {
        // No source
        let mut session = PlacementSession::new(PlacementConfig::default());
        session.set_reticle_ready();
        assert!(session.commit_placement().is_none());

        // Source but cursor never loaded
        let mut session = PlacementSession::new(PlacementConfig::default());
        session.begin_hit_test_request();
        session.attach_hit_test_source(HitTestHandle::new());
        assert!(session.commit_placement().is_none());

        // Everything but a visible cursor
        let mut session = ready_session(PlacementConfig::default());
        session.advance_frame(&FrameInput::empty());
        assert!(session.commit_placement().is_none());
        assert_eq!(session.phase(), SessionPhase::Searching);
    }

    #[test]
    fn test_placement_effects() {
        let mut session = ready_session(PlacementConfig::with_scale(2.0));
        session.advance_frame(&hit_frame(Vec3::new(1.0, 0.0, -2.0)));

        let released = session.commit_placement();
        assert!(released.is_some());

        assert_eq!(session.phase(), SessionPhase::Placed);
        assert!(session.video().playing);
        assert_eq!(session.anchor().position, Vec3::new(1.0, 0.0, -2.0));
        assert!(session.video_visible());
        assert!(session.shadow_visible());
        assert!(!session.reticle().visible);
        assert!(session.hit_test().is_idle());
        assert_eq!(session.plane_scale(), Vec3::new(2.0, 2.0, 2.0));
        check_invariants(&session);

        // The transform carries the anchor position and the scale
        let transform = session.video_transform();
        let (scale, _, translation) = transform.to_scale_rotation_translation();
        assert_relative_eq!(translation.x, 1.0);
        assert_relative_eq!(translation.y, 0.0);
        assert_relative_eq!(translation.z, -2.0);
        assert_relative_eq!(scale.x, 2.0);
        assert_relative_eq!(scale.y, 2.0);
        assert_relative_eq!(scale.z, 2.0);
    }

    #[test]
    fn test_second_select_is_noop() {
        let mut session = ready_session(PlacementConfig::default());
        session.advance_frame(&hit_frame(Vec3::new(0.0, 0.0, -1.0)));
        assert!(session.commit_placement().is_some());
        assert!(session.commit_placement().is_none());
    }

    #[test]
    fn test_orientation_while_placed() {
        let mut session = ready_session(PlacementConfig::default());
        session.advance_frame(&hit_frame(Vec3::ZERO));
        session.commit_placement();

        // Viewer close by on +X: yaw points at it, tilt maxed out
        let input = FrameInput {
            hits: Vec::new(),
            viewer: Some(Pose::from_position(Vec3::new(0.4, 0.0, 0.0))),
        };
        session.advance_frame(&input);
        assert_relative_eq!(session.yaw(), std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(session.tilt(), session.config().max_tilt);

        // Viewer far away on +Z: yaw follows, tilt gone
        let input = FrameInput {
            hits: Vec::new(),
            viewer: Some(Pose::from_position(Vec3::new(0.0, 1.6, 8.0))),
        };
        session.advance_frame(&input);
        assert_relative_eq!(session.yaw(), 0.0);
        assert_relative_eq!(session.tilt(), 0.0);

        // Frame without a viewer pose changes nothing
        session.advance_frame(&FrameInput::empty());
        assert_relative_eq!(session.yaw(), 0.0);
        assert_relative_eq!(session.tilt(), 0.0);
    }

    #[test]
    fn test_hits_ignored_while_placed() {
        let mut session = ready_session(PlacementConfig::default());
        session.advance_frame(&hit_frame(Vec3::ZERO));
        session.commit_placement();

        session.advance_frame(&hit_frame(Vec3::new(5.0, 0.0, 5.0)));
        assert!(!session.reticle().visible);
        assert_eq!(session.anchor().position, Vec3::ZERO);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut session = ready_session(PlacementConfig::with_scale(3.0));
        session.advance_frame(&hit_frame(Vec3::new(2.0, 0.5, -1.0)));
        session.commit_placement();

        let released = session.reset();
        assert!(released.is_none()); // already released on placement

        assert_eq!(session.phase(), SessionPhase::Searching);
        assert!(!session.video().playing);
        assert!(session.video().at_start);
        assert!(!session.video_visible());
        assert!(!session.shadow_visible());
        assert_eq!(session.anchor().position, Vec3::ZERO);
        assert_relative_eq!(session.yaw(), 0.0);
        assert_relative_eq!(session.tilt(), 0.0);
        assert_eq!(session.plane_scale(), Vec3::ONE);
        assert!(session.hit_test().is_idle());
        check_invariants(&session);
    }

    #[test]
    fn test_reset_idempotent() {
        let mut session = ready_session(PlacementConfig::default());
        session.advance_frame(&hit_frame(Vec3::new(1.0, 0.0, 0.0)));
        session.commit_placement();

        session.reset();
        let anchor = *session.anchor();
        let video = *session.video();
        let phase = session.phase();

        session.reset();
        assert_eq!(*session.anchor(), anchor);
        assert_eq!(*session.video(), video);
        assert_eq!(session.phase(), phase);
        check_invariants(&session);
    }

    #[test]
    fn test_reset_mid_search_releases_source() {
        let mut session = ready_session(PlacementConfig::default());
        let released = session.reset();
        // Source held at session end is released, not restored
        assert!(released.is_some());
        assert!(session.hit_test().is_idle());
        // A fresh session requests a fresh one
        assert!(session.begin_hit_test_request());
    }

    #[test]
    fn test_late_source_resolution_rejected() {
        let mut session = ready_session(PlacementConfig::default());
        session.advance_frame(&hit_frame(Vec3::ZERO));
        session.commit_placement();

        // A second request's resolution arriving after placement is not
        // adopted; the handle comes back for cancellation.
        let stray = HitTestHandle::new();
        assert_eq!(session.attach_hit_test_source(stray), Some(stray));
        assert!(session.hit_test().is_idle());
    }

    #[test]
    fn test_metadata_independent_of_placement() {
        let mut session = PlacementSession::new(PlacementConfig::default());
        assert!(session.video().aspect.is_none());
        session.apply_video_metadata(VideoMetadata {
            width: 1920,
            height: 1080,
        });
        let aspect = session.video().aspect.unwrap();
        assert_relative_eq!(aspect, 1920.0 / 1080.0);
        // Still searching; metadata does not touch the state machine
        assert_eq!(session.phase(), SessionPhase::Searching);
    }

    #[test]
    fn test_shadow_follows_yaw_not_tilt() {
        let mut session = ready_session(PlacementConfig::default());
        session.advance_frame(&hit_frame(Vec3::new(0.0, 0.0, -3.0)));
        session.commit_placement();
        session.advance_frame(&FrameInput {
            hits: Vec::new(),
            viewer: Some(Pose::from_position(Vec3::new(0.6, 1.0, -3.0))),
        });
        assert!(session.tilt() > 0.0);

        // The shadow transform contains no tilt component: its local +Z
        // (disc normal after the -90 degree X rotation) stays world +Y.
        let normal = session.shadow_transform().transform_vector3(Vec3::Z);
        assert_relative_eq!(normal.y, 1.0, epsilon = 1e-5);

        // The video plane normal pitches away from vertical.
        let plane_normal = session.video_transform().transform_vector3(Vec3::Z);
        assert!(plane_normal.y.abs() > 1e-3);
    }

    #[test]
    fn test_invariants_across_full_cycle() {
        let mut session = PlacementSession::new(PlacementConfig::default());
        check_invariants(&session);
        session.set_reticle_ready();
        session.begin_hit_test_request();
        check_invariants(&session);
        session.attach_hit_test_source(HitTestHandle::new());
        check_invariants(&session);
        session.advance_frame(&hit_frame(Vec3::new(1.0, 0.0, -1.0)));
        check_invariants(&session);
        session.commit_placement();
        check_invariants(&session);
        session.advance_frame(&FrameInput {
            hits: Vec::new(),
            viewer: Some(Pose::from_position(Vec3::new(0.0, 1.0, 2.0))),
        });
        check_invariants(&session);
        session.reset();
        check_invariants(&session);
    }
}
