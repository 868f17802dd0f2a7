//! Rendering and recording configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Visible world height (world units); width follows the aspect ratio
    pub frustum_height: f32,

    /// Camera distance above the z = 0 drawing plane
    pub camera_z: f32,

    /// Near clipping plane
    pub near_plane: f32,

    /// Far clipping plane
    pub far_plane: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            frustum_height: 100.0,
            camera_z: 10.0,
            near_plane: 0.1,
            far_plane: 1000.0,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }

    /// World rectangle covered by the camera (width, height)
    pub fn world_extent(&self) -> (f32, f32) {
        (self.frustum_height * self.aspect_ratio(), self.frustum_height)
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames and audio
    pub output_dir: String,

    /// Frame rate (FPS)
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: "recording".to_string(),
            fps: 60,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil() as usize
    }

    /// Simulated time step per captured frame (seconds)
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.fps as f32
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> String {
        format!("{}/frames", self.output_dir)
    }

    /// Audio file path
    pub fn audio_path(&self) -> String {
        format!("{}/audio.wav", self.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_extent_follows_aspect() {
        let config = RenderConfig::default();
        let (w, h) = config.world_extent();
        assert_eq!(h, 100.0);
        assert!((w - 100.0 * 1280.0 / 720.0).abs() < 1e-3);
    }

    #[test]
    fn test_recording_frames() {
        let config = RecordingConfig::new(2.5);
        assert_eq!(config.total_frames(), 150);
        assert_eq!(config.frames_dir(), "recording/frames");
        assert_eq!(config.audio_path(), "recording/audio.wav");
    }
}
