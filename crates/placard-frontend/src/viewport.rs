//! Widget viewport
//!
//! The scene renders into an offscreen texture registered with egui, so the
//! placement view sits inside the widget layout like any other image.

use std::sync::Arc;

use placard_core::{CameraConfig, PlacementConfig, PlacementSession, Pose, VideoFrame};
use placard_renderer::{Camera, Renderer, ReticleVertex};

/// Offscreen target the scene resolves into.
///
/// Only the view is held; it keeps the underlying texture alive and nothing
/// else reads the texture directly.
struct SceneTarget {
    view: wgpu::TextureView,
    texture_id: egui::TextureId,
    size: (u32, u32),
}

/// Viewport rendering state
pub struct Viewport {
    renderer: Renderer,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    target: Option<SceneTarget>,
}

impl Viewport {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        camera_config: &CameraConfig,
        placement_config: &PlacementConfig,
    ) -> Self {
        let renderer = Renderer::new(&device, format, 800, 600, camera_config, placement_config);
        Self {
            renderer,
            device,
            queue,
            target: None,
        }
    }

    pub fn camera(&self) -> &Camera {
        self.renderer.camera()
    }

    /// Match the offscreen target to the widget size.
    ///
    /// A size change frees the stale target, builds a fresh one, and resizes
    /// the renderer; this is the whole of resize handling.
    pub fn ensure_texture(
        &mut self,
        width: u32,
        height: u32,
        egui_renderer: &mut egui_wgpu::Renderer,
    ) -> egui::TextureId {
        let size = (width.max(1), height.max(1));
        match &self.target {
            Some(target) if target.size == size => target.texture_id,
            _ => {
                if let Some(stale) = self.target.take() {
                    egui_renderer.free_texture(&stale.texture_id);
                }
                let target = self.create_target(size, egui_renderer);
                let texture_id = target.texture_id;
                self.renderer.resize(&self.device, size.0, size.1);
                self.target = Some(target);
                texture_id
            }
        }
    }

    fn create_target(
        &self,
        (width, height): (u32, u32),
        egui_renderer: &mut egui_wgpu::Renderer,
    ) -> SceneTarget {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Placard Scene Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.renderer.format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let texture_id =
            egui_renderer.register_native_texture(&self.device, &view, wgpu::FilterMode::Linear);
        SceneTarget {
            view,
            texture_id,
            size: (width, height),
        }
    }

    /// Render the scene to the viewport target
    pub fn render(&mut self) {
        let Some(target) = &self.target else {
            return;
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Placard Scene Encoder"),
            });

        self.renderer.render(&mut encoder, &target.view, &self.queue);

        self.queue.submit([encoder.finish()]);
    }

    /// Point the scene camera at the viewer pose for this frame
    pub fn set_viewer_pose(&mut self, pose: &Pose) {
        self.renderer.set_viewer_pose(pose.position, pose.rotation);
    }

    /// Push the session's proxy visibility and transforms to the GPU
    pub fn sync_session(&mut self, session: &PlacementSession) {
        self.renderer.set_reticle_visible(session.reticle().visible);
        self.renderer
            .set_reticle_transform(&self.queue, session.reticle_transform());
        self.renderer.set_video_visible(session.video_visible());
        self.renderer
            .set_video_transform(&self.queue, session.video_transform());
        self.renderer.set_shadow_visible(session.shadow_visible());
        self.renderer
            .set_shadow_transform(&self.queue, session.shadow_transform());
    }

    pub fn apply_video_aspect(&mut self, aspect: f32) {
        self.renderer.apply_video_aspect(&self.device, aspect);
    }

    pub fn upload_video_frame(&mut self, frame: &VideoFrame) {
        let Viewport {
            renderer,
            device,
            queue,
            ..
        } = self;
        renderer.upload_video_frame(device, queue, frame);
    }

    pub fn set_reticle_mesh(&mut self, vertices: &[ReticleVertex]) {
        self.renderer.set_reticle_mesh(&self.device, vertices);
    }
}
