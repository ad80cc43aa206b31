/// Video configuration requested for the local camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Show the local preview mirrored, as a selfie camera would.
    pub mirrored: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30,
            mirrored: true,
        }
    }
}
