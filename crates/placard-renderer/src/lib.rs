//! Placard Renderer
//!
//! WGPU-based rendering of the placement proxies: the video plane, the
//! soft circular shadow decal, and the placement reticle.

pub mod camera;
pub mod renderer;
pub mod reticle;
pub mod shadow;
pub mod video_plane;

pub use camera::*;
pub use renderer::*;
pub use reticle::ReticleVertex;
