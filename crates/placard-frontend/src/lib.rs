//! Placard Frontend
//!
//! The AR video placement widget: an eframe app wiring the placement
//! session to an AR backend, a video backend, and the proxy renderer.

pub mod app;
pub mod options;
pub mod reticle_loader;
pub mod sim;
pub mod video;
mod viewport;

pub use app::PlacardApp;
pub use options::WidgetOptions;

#[cfg(target_arch = "wasm32")]
mod web;
#[cfg(target_arch = "wasm32")]
pub use web::start;
