//! AR runtime seam: hit testing and per-frame poses

use uuid::Uuid;

use crate::pose::Pose;

/// Opaque handle to a hit-test source.
///
/// Owned by the session while searching; released exactly once, either on
/// placement or on session end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitTestHandle(Uuid);

impl HitTestHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HitTestHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle of the per-session hit-test source.
///
/// `Pending` suppresses duplicate acquisition requests while one is already
/// in flight; resolution arrives on a later frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitTestState {
    /// No source and no request in flight
    #[default]
    Idle,
    /// Acquisition requested, awaiting resolution
    Pending,
    /// Source available for per-frame queries
    Ready(HitTestHandle),
}

impl HitTestState {
    pub fn handle(&self) -> Option<HitTestHandle> {
        match self {
            HitTestState::Ready(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, HitTestState::Idle)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, HitTestState::Ready(_))
    }
}

/// Everything a backend extracted from one rendered frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Surface hits for this frame, nearest first
    pub hits: Vec<Pose>,
    /// Tracked viewer (primary view) pose, when available
    pub viewer: Option<Pose>,
}

impl FrameInput {
    /// Frame with no hits and no viewer pose
    pub fn empty() -> Self {
        Self::default()
    }
}

/// AR session backend seam.
///
/// Source acquisition is fire-and-forget: `request_hit_test_source` returns
/// immediately and the resolved handle shows up in a later
/// `poll_hit_test_source`. A request that never resolves simply means no
/// cursor ever appears.
pub trait ArRuntime {
    /// Whether the runtime can hit-test real-world surfaces at all
    fn supports_hit_test(&self) -> bool;

    /// Begin asynchronous source acquisition
    fn request_hit_test_source(&mut self);

    /// Take a resolved source, if one arrived since the last poll
    fn poll_hit_test_source(&mut self) -> Option<HitTestHandle>;

    /// Release a source that is no longer needed
    fn cancel_hit_test_source(&mut self, handle: HitTestHandle);

    /// Sample surface hits and the viewer pose for the current frame.
    /// `source` is the session's current handle; without one the backend
    /// reports no hits.
    fn sample_frame(&mut self, source: Option<HitTestHandle>) -> FrameInput;
}
