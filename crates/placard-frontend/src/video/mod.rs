//! Video playback backends

use placard_core::{SetupError, VideoSource, VideoState};

#[cfg(all(feature = "gst", not(target_arch = "wasm32")))]
mod gst;
mod null;

#[cfg(all(feature = "gst", not(target_arch = "wasm32")))]
pub use gst::GstVideo;
pub use null::NullVideo;

/// Open the default backend for this build
pub fn open(url: &str, state: &VideoState) -> Result<Box<dyn VideoSource>, SetupError> {
    #[cfg(all(feature = "gst", not(target_arch = "wasm32")))]
    {
        Ok(Box::new(GstVideo::open(url, state)?))
    }
    #[cfg(not(all(feature = "gst", not(target_arch = "wasm32"))))]
    {
        let _ = state;
        Ok(Box::new(NullVideo::new(url)))
    }
}

/// Drive a backend to the session's desired playback state.
///
/// Only state edges issue backend calls; steady states are free.
pub fn sync(source: &mut dyn VideoSource, desired: &VideoState, last: &VideoState) {
    if desired.playing != last.playing {
        if desired.playing {
            source.play();
        } else {
            source.pause();
        }
    }
    if desired.at_start && !last.at_start {
        source.rewind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placard_core::{VideoFrame, VideoMetadata};

    #[derive(Default)]
    struct RecordingVideo {
        calls: Vec<&'static str>,
    }

    impl VideoSource for RecordingVideo {
        fn play(&mut self) {
            self.calls.push("play");
        }
        fn pause(&mut self) {
            self.calls.push("pause");
        }
        fn rewind(&mut self) {
            self.calls.push("rewind");
        }
        fn poll_metadata(&mut self) -> Option<VideoMetadata> {
            None
        }
        fn take_frame(&mut self) -> Option<VideoFrame> {
            None
        }
    }

    #[test]
    fn test_play_edge() {
        let mut video = RecordingVideo::default();
        let last = VideoState::default();
        let desired = VideoState {
            playing: true,
            at_start: false,
            ..last
        };
        sync(&mut video, &desired, &last);
        assert_eq!(video.calls, vec!["play"]);
    }

    #[test]
    fn test_steady_state_is_silent() {
        let mut video = RecordingVideo::default();
        let state = VideoState {
            playing: true,
            at_start: false,
            ..VideoState::default()
        };
        sync(&mut video, &state, &state);
        assert!(video.calls.is_empty());
    }

    #[test]
    fn test_reset_edge_pauses_and_rewinds() {
        let mut video = RecordingVideo::default();
        let playing = VideoState {
            playing: true,
            at_start: false,
            ..VideoState::default()
        };
        let reset = VideoState {
            playing: false,
            at_start: true,
            ..playing
        };
        sync(&mut video, &reset, &playing);
        assert_eq!(video.calls, vec!["pause", "rewind"]);
    }

    #[test]
    fn test_double_reset_is_idempotent() {
        let mut video = RecordingVideo::default();
        let reset = VideoState::default();
        sync(&mut video, &reset, &reset);
        assert!(video.calls.is_empty());
    }
}
