//! Placard Core
//!
//! Domain logic for surface-anchored video placement:
//! - Pose: position + orientation in scene space
//! - PlacementSession: the searching/placed state machine
//! - orient: viewer-relative yaw and approach-tilt math
//! - runtime/media: seams implemented by AR and video backends

pub mod config;
pub mod error;
pub mod media;
pub mod orient;
pub mod pose;
pub mod runtime;
pub mod session;

pub use config::*;
pub use error::*;
pub use media::*;
pub use pose::*;
pub use runtime::*;
pub use session::*;
