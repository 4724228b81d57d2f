//! Widget initialization options

/// Options for one Placard widget instance
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    /// Id of the host element the widget is inserted into (web builds)
    pub container_id: String,
    /// Video resource locator
    pub video_url: String,
    /// Uniform scale applied to the video plane on placement
    pub scale: f32,
}

impl WidgetOptions {
    pub fn new(container_id: impl Into<String>, video_url: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            video_url: video_url.into(),
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}
