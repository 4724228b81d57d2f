//! Placard widget application
//!
//! One eframe app hosting the placement session: the start control gated
//! on hit-test support, the per-frame drive of the session state machine,
//! and the viewport the scene renders into. All session state lives on
//! `PlacementSession`; this type only wires backends to it.

use glam::Vec3;

use placard_core::{
    ArRuntime, CameraConfig, PlacementConfig, PlacementSession, SetupError, VideoSource,
    VideoState,
};

use crate::options::WidgetOptions;
use crate::reticle_loader::{self, ReticleSlot};
use crate::sim::{Ray, SimRuntime};
use crate::video;
use crate::viewport::Viewport;

/// Cursor model location, loaded asynchronously at startup
const RETICLE_MODEL_PATH: &str = "media/reticle.stl";

/// The Placard widget
pub struct PlacardApp {
    session: PlacementSession,
    runtime: SimRuntime,
    video: Box<dyn VideoSource>,
    viewport: Viewport,
    render_state: egui_wgpu::RenderState,
    reticle_slot: ReticleSlot,
    session_active: bool,
    last_video: VideoState,
}

impl PlacardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, options: WidgetOptions) -> Result<Self, SetupError> {
        let render_state = cc
            .wgpu_render_state
            .clone()
            .ok_or_else(|| SetupError::Graphics("wgpu render state unavailable".into()))?;

        let placement_config = PlacementConfig::with_scale(options.scale);
        let camera_config = CameraConfig::default();

        let viewport = Viewport::new(
            render_state.device.clone(),
            render_state.queue.clone(),
            render_state.target_format,
            &camera_config,
            &placement_config,
        );

        let video = video::open(&options.video_url, &VideoState::default())?;
        let reticle_slot = reticle_loader::spawn_load(RETICLE_MODEL_PATH.into());

        Ok(Self {
            session: PlacementSession::new(placement_config),
            runtime: SimRuntime::new(),
            video,
            viewport,
            render_state,
            reticle_slot,
            session_active: false,
            last_video: VideoState::default(),
        })
    }

    /// End the session: reset the controller and release a still-held
    /// hit-test source.
    fn end_session(&mut self) {
        if let Some(handle) = self.session.reset() {
            self.runtime.cancel_hit_test_source(handle);
        }
        self.session_active = false;
        tracing::info!("session ended");
    }

    /// One tick of the per-frame update loop
    fn drive_frame(&mut self, response: &egui::Response, scroll: f32) {
        // Preview camera input
        if response.dragged() {
            let delta = response.drag_delta();
            self.runtime.orbit(delta.x, delta.y);
        }
        if scroll != 0.0 {
            self.runtime.zoom(scroll);
        }

        let viewer = self.runtime.viewer_pose();
        self.viewport.set_viewer_pose(&viewer);

        let pointer_ray = self.pointer_ray(response);
        self.runtime.set_pointer_ray(pointer_ray);

        if self.session_active {
            // Acquire a hit-test source once; duplicate requests are
            // suppressed while one is in flight.
            if self.session.begin_hit_test_request() {
                self.runtime.request_hit_test_source();
            }
            if let Some(handle) = self.runtime.poll_hit_test_source()
                && let Some(rejected) = self.session.attach_hit_test_source(handle)
            {
                self.runtime.cancel_hit_test_source(rejected);
            }

            let input = self.runtime.sample_frame(self.session.hit_test().handle());
            self.session.advance_frame(&input);

            // Selection gesture
            if response.clicked()
                && let Some(released) = self.session.commit_placement()
            {
                self.runtime.cancel_hit_test_source(released);
            }
        }

        // The cursor model may have finished loading
        if !self.session.reticle_ready()
            && let Some(mesh) = self.reticle_slot.lock().take()
        {
            self.viewport.set_reticle_mesh(&mesh);
            self.session.set_reticle_ready();
        }

        // Playback follows the session's desired state
        let desired = *self.session.video();
        video::sync(self.video.as_mut(), &desired, &self.last_video);
        self.last_video = desired;

        if self.session.video().aspect.is_none()
            && let Some(metadata) = self.video.poll_metadata()
        {
            self.session.apply_video_metadata(metadata);
            self.viewport.apply_video_aspect(metadata.aspect());
        }
        if let Some(frame) = self.video.take_frame() {
            self.viewport.upload_video_frame(&frame);
        }

        self.viewport.sync_session(&self.session);
    }

    /// World-space ray under the pointer, if it is over the viewport
    fn pointer_ray(&self, response: &egui::Response) -> Option<Ray> {
        let pos = response.hover_pos()?;
        let rect = response.rect;
        let ndc_x = (pos.x - rect.left()) / rect.width() * 2.0 - 1.0;
        let ndc_y = 1.0 - (pos.y - rect.top()) / rect.height() * 2.0;

        let inverse = self.viewport.camera().view_proj().inverse();
        let near = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        Some(Ray {
            origin: near,
            dir: (far - near).normalize(),
        })
    }
}

impl eframe::App for PlacardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("placard-controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Placard");
                ui.separator();
                if self.session_active {
                    if ui.button("End session").clicked() {
                        self.end_session();
                    }
                    ui.label("tap a surface to place the video");
                } else {
                    let supported = self.runtime.supports_hit_test();
                    let start = ui.add_enabled(supported, egui::Button::new("Start AR"));
                    if start.clicked() {
                        self.session_active = true;
                        tracing::info!("session started");
                    }
                    if !supported {
                        ui.label("surface hit-testing not supported");
                    }
                }
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let available = ui.available_size();
                let pixels_per_point = ctx.pixels_per_point();
                let width = (available.x * pixels_per_point) as u32;
                let height = (available.y * pixels_per_point) as u32;

                let texture_id = {
                    let mut egui_renderer = self.render_state.renderer.write();
                    self.viewport.ensure_texture(width, height, &mut egui_renderer)
                };

                let image = egui::Image::new(egui::load::SizedTexture::new(texture_id, available))
                    .sense(egui::Sense::click_and_drag());
                let response = ui.add(image);

                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                self.drive_frame(&response, scroll);
                self.viewport.render();
            });

        // Continuous per-display-refresh drive
        ctx.request_repaint();
    }
}
