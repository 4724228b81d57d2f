//! Top-level renderer
//!
//! Owns the camera GPU resources, the MSAA and depth targets, and the
//! three proxy sub-renderers. Draw order is fixed: shadow, then video
//! plane, then reticle.

use glam::{Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;

use placard_core::{CameraConfig, PlacementConfig, VideoFrame};

use crate::camera::Camera;
use crate::reticle::{ReticleRenderer, ReticleVertex};
use crate::shadow::ShadowRenderer;
use crate::video_plane::VideoPlaneRenderer;

/// MSAA sample count for the scene target
pub const SAMPLE_COUNT: u32 = 4;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Scene renderer for the placement proxies
pub struct Renderer {
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    camera: Camera,
    camera_buffer: wgpu::Buffer,
    msaa_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    shadow: ShadowRenderer,
    video_plane: VideoPlaneRenderer,
    reticle: ReticleRenderer,
}

impl Renderer {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        camera_config: &CameraConfig,
        placement_config: &PlacementConfig,
    ) -> Self {
        let camera = Camera::new(camera_config, width as f32 / height as f32);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera.uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let msaa_view = create_msaa_view(device, format, width, height);
        let depth_view = create_depth_view(device, width, height);

        let shadow = ShadowRenderer::new(
            device,
            format,
            DEPTH_FORMAT,
            SAMPLE_COUNT,
            &camera_bind_group_layout,
            &camera_buffer,
        );
        let video_plane = VideoPlaneRenderer::new(
            device,
            format,
            DEPTH_FORMAT,
            SAMPLE_COUNT,
            &camera_bind_group_layout,
            &camera_buffer,
            placement_config.default_plane_size,
        );
        let reticle = ReticleRenderer::new(
            device,
            format,
            DEPTH_FORMAT,
            SAMPLE_COUNT,
            &camera_bind_group_layout,
            &camera_buffer,
        );

        Self {
            format,
            width,
            height,
            camera,
            camera_buffer,
            msaa_view,
            depth_view,
            shadow,
            video_plane,
            reticle,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Resize the render targets and update the camera aspect ratio
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.msaa_view = create_msaa_view(device, self.format, width, height);
        self.depth_view = create_depth_view(device, width, height);
        self.camera.update_aspect(width as f32 / height as f32);
    }

    /// Follow the viewer pose for this frame
    pub fn set_viewer_pose(&mut self, position: Vec3, rotation: Quat) {
        self.camera.set_pose(position, rotation);
    }

    pub fn set_video_transform(&self, queue: &wgpu::Queue, transform: Mat4) {
        self.video_plane.set_transform(queue, transform);
    }

    pub fn set_video_visible(&mut self, visible: bool) {
        self.video_plane.set_visible(visible);
    }

    pub fn apply_video_aspect(&mut self, device: &wgpu::Device, aspect: f32) {
        self.video_plane.apply_aspect(device, aspect);
    }

    pub fn upload_video_frame(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &VideoFrame,
    ) {
        self.video_plane.upload_frame(device, queue, frame);
    }

    pub fn set_shadow_transform(&self, queue: &wgpu::Queue, transform: Mat4) {
        self.shadow.set_transform(queue, transform);
    }

    pub fn set_shadow_visible(&mut self, visible: bool) {
        self.shadow.set_visible(visible);
    }

    pub fn set_reticle_mesh(&mut self, device: &wgpu::Device, vertices: &[ReticleVertex]) {
        self.reticle.set_mesh(device, vertices);
    }

    pub fn reticle_has_mesh(&self) -> bool {
        self.reticle.has_mesh()
    }

    pub fn set_reticle_transform(&self, queue: &wgpu::Queue, transform: Mat4) {
        self.reticle.set_transform(queue, transform);
    }

    pub fn set_reticle_visible(&mut self, visible: bool) {
        self.reticle.set_visible(visible);
    }

    /// Render one frame into `target`, clearing to transparent
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        queue: &wgpu::Queue,
    ) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.uniform()]),
        );

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Placard Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.msaa_view,
                resolve_target: Some(target),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.shadow.render(&mut render_pass);
        self.video_plane.render(&mut render_pass);
        self.reticle.render(&mut render_pass);
    }
}

fn create_msaa_view(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("MSAA Color Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: SAMPLE_COUNT,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: SAMPLE_COUNT,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
