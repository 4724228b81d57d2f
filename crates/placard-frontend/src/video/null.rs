//! Fallback backend for builds without a video stack

use placard_core::{VideoFrame, VideoMetadata, VideoSource};

/// Silent backend: fixed metadata, no frames.
///
/// Keeps the widget fully drivable when the `gst` feature is off; the
/// placed plane simply shows nothing.
pub struct NullVideo {
    metadata: Option<VideoMetadata>,
}

impl NullVideo {
    pub fn new(url: &str) -> Self {
        tracing::warn!(url, "video decoding disabled, built without the gst feature");
        Self {
            metadata: Some(VideoMetadata {
                width: 640,
                height: 360,
            }),
        }
    }
}

impl VideoSource for NullVideo {
    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn rewind(&mut self) {}

    fn poll_metadata(&mut self) -> Option<VideoMetadata> {
        self.metadata.take()
    }

    fn take_frame(&mut self) -> Option<VideoFrame> {
        None
    }
}
