//! Video media state and the playback backend seam

/// Intrinsic video properties, known only once the backend has seen the
/// stream metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
}

impl VideoMetadata {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// One decoded RGBA frame handed from a backend to the renderer
#[derive(Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Playback state tracked by the session.
///
/// The session records the *desired* state; a `VideoSource` backend is
/// synchronized to it once per frame by the frontend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoState {
    /// Playback requested
    pub playing: bool,
    /// Rewound to the first frame (set on reset, cleared on placement)
    pub at_start: bool,
    /// Restart from the beginning at end of stream
    pub looping: bool,
    /// Read once by the backend at construction, never mutated afterwards
    pub muted: bool,
    /// Intrinsic aspect ratio, present after the metadata signal
    pub aspect: Option<f32>,
}

impl Default for VideoState {
    fn default() -> Self {
        Self {
            playing: false,
            at_start: true,
            looping: true,
            muted: false,
            aspect: None,
        }
    }
}

/// Playback backend seam.
///
/// Implementations decode an external video resource and surface RGBA
/// frames plus a one-shot metadata signal. All methods are polled from the
/// single per-frame callback; none may block.
pub trait VideoSource {
    fn play(&mut self);
    fn pause(&mut self);
    /// Seek back to the first frame
    fn rewind(&mut self);
    /// Intrinsic dimensions, yielded once when they become known
    fn poll_metadata(&mut self) -> Option<VideoMetadata>;
    /// Most recent decoded frame since the last call, if any
    fn take_frame(&mut self) -> Option<VideoFrame>;
}
