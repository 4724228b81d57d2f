//! Widget setup errors

/// Errors that can occur while setting up the widget
#[derive(Debug, Clone, thiserror::Error)]
pub enum SetupError {
    #[error("container element '{id}' not found")]
    ContainerNotFound { id: String },

    #[error("video backend error: {0}")]
    Video(String),

    #[error("graphics error: {0}")]
    Graphics(String),
}
