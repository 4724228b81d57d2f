//! GStreamer playback backend
//!
//! playbin with a custom RGBA appsink as the video sink. Decoded frames
//! land in a single-slot mailbox that the frame callback drains; metadata
//! is captured from the first sample's caps. The bus is serviced from the
//! same per-frame path, which is where end-of-stream looping happens.

use std::sync::Arc;

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use parking_lot::Mutex;

use placard_core::{SetupError, VideoFrame, VideoMetadata, VideoSource, VideoState};

type FrameSlot = Arc<Mutex<Option<VideoFrame>>>;
type MetadataSlot = Arc<Mutex<Option<VideoMetadata>>>;

/// GStreamer-backed video source
pub struct GstVideo {
    playbin: gst::Element,
    bus: gst::Bus,
    looping: bool,
    frame: FrameSlot,
    metadata: MetadataSlot,
    metadata_reported: bool,
}

impl GstVideo {
    /// Build the pipeline and preroll it paused, so metadata and a first
    /// frame become available before playback is requested.
    pub fn open(url: &str, state: &VideoState) -> Result<Self, SetupError> {
        gst::init().map_err(video_err)?;

        let playbin = gst::ElementFactory::make("playbin")
            .property("uri", url)
            .build()
            .map_err(video_err)?;
        // Read exactly once from the session's default state
        playbin.set_property("mute", state.muted);

        let convert = gst::ElementFactory::make("videoconvert")
            .build()
            .map_err(video_err)?;

        let caps = gst_video::VideoCapsBuilder::new()
            .format(gst_video::VideoFormat::Rgba)
            .build();
        let appsink = gst_app::AppSink::builder()
            .caps(&caps)
            .max_buffers(2)
            .drop(true)
            .build();

        let frame: FrameSlot = Arc::new(Mutex::new(None));
        let metadata: MetadataSlot = Arc::new(Mutex::new(None));
        appsink.set_callbacks(
            gst_app::AppSinkCallbacks::builder()
                .new_sample({
                    let frame = frame.clone();
                    let metadata = metadata.clone();
                    move |sink| handle_sample(sink, &frame, &metadata)
                })
                .build(),
        );

        let sink_bin = gst::Bin::builder().name("placard-video-sink").build();
        sink_bin
            .add_many([&convert, appsink.upcast_ref()])
            .map_err(video_err)?;
        gst::Element::link_many([&convert, appsink.upcast_ref()]).map_err(video_err)?;

        let convert_sink = convert
            .static_pad("sink")
            .ok_or_else(|| SetupError::Video("videoconvert has no sink pad".into()))?;
        let ghost = gst::GhostPad::with_target(&convert_sink).map_err(video_err)?;
        sink_bin.add_pad(&ghost).map_err(video_err)?;

        playbin.set_property("video-sink", &sink_bin);

        let bus = playbin
            .bus()
            .ok_or_else(|| SetupError::Video("pipeline has no bus".into()))?;

        playbin
            .set_state(gst::State::Paused)
            .map_err(|e| SetupError::Video(format!("failed to preroll: {e}")))?;

        tracing::info!(url, "video pipeline created");

        Ok(Self {
            playbin,
            bus,
            looping: state.looping,
            frame,
            metadata,
            metadata_reported: false,
        })
    }

    /// Service pending bus messages; loops at end of stream.
    fn pump_bus(&mut self) {
        while let Some(message) = self
            .bus
            .pop_filtered(&[gst::MessageType::Eos, gst::MessageType::Error])
        {
            match message.view() {
                gst::MessageView::Eos(_) => {
                    if self.looping {
                        self.seek_start();
                    }
                }
                gst::MessageView::Error(err) => {
                    tracing::error!(error = %err.error(), "video pipeline error");
                }
                _ => {}
            }
        }
    }

    fn seek_start(&self) {
        if let Err(e) = self.playbin.seek_simple(
            gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT,
            gst::ClockTime::ZERO,
        ) {
            tracing::warn!(error = %e, "seek to start failed");
        }
    }
}

impl VideoSource for GstVideo {
    fn play(&mut self) {
        if let Err(e) = self.playbin.set_state(gst::State::Playing) {
            tracing::error!(error = %e, "failed to start playback");
        }
    }

    fn pause(&mut self) {
        if let Err(e) = self.playbin.set_state(gst::State::Paused) {
            tracing::error!(error = %e, "failed to pause playback");
        }
    }

    fn rewind(&mut self) {
        self.seek_start();
    }

    fn poll_metadata(&mut self) -> Option<VideoMetadata> {
        if self.metadata_reported {
            return None;
        }
        let metadata = self.metadata.lock().take()?;
        self.metadata_reported = true;
        Some(metadata)
    }

    fn take_frame(&mut self) -> Option<VideoFrame> {
        self.pump_bus();
        self.frame.lock().take()
    }
}

impl Drop for GstVideo {
    fn drop(&mut self) {
        let _ = self.playbin.set_state(gst::State::Null);
    }
}

fn handle_sample(
    sink: &gst_app::AppSink,
    frame_slot: &FrameSlot,
    metadata_slot: &MetadataSlot,
) -> Result<gst::FlowSuccess, gst::FlowError> {
    let sample = sink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
    let buffer = sample.buffer().ok_or(gst::FlowError::Error)?;
    let caps = sample.caps().ok_or(gst::FlowError::Error)?;
    let info = gst_video::VideoInfo::from_caps(caps).map_err(|_| gst::FlowError::Error)?;

    let mapped = gst_video::VideoFrameRef::from_buffer_ref_readable(buffer, &info)
        .map_err(|_| gst::FlowError::Error)?;

    let width = info.width();
    let height = info.height();
    let stride = mapped.plane_stride()[0] as usize;
    let data = mapped.plane_data(0).map_err(|_| gst::FlowError::Error)?;

    // Drop any row padding the decoder added
    let row_bytes = width as usize * 4;
    let mut rgba = Vec::with_capacity(row_bytes * height as usize);
    for row in data.chunks(stride).take(height as usize) {
        rgba.extend_from_slice(&row[..row_bytes]);
    }

    {
        let mut slot = metadata_slot.lock();
        if slot.is_none() {
            *slot = Some(VideoMetadata { width, height });
        }
    }
    *frame_slot.lock() = Some(VideoFrame {
        width,
        height,
        rgba,
    });

    Ok(gst::FlowSuccess::Ok)
}

fn video_err(e: impl std::fmt::Display) -> SetupError {
    SetupError::Video(e.to_string())
}
