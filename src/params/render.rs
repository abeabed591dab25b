//! Recording configuration for offline rendering.

use std::path::PathBuf;
use std::time::Duration;

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames and audio
    pub output_dir: PathBuf,

    /// Edge length of one grid cell in the saved frames (pixels)
    pub cell_px: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: PathBuf::from("recording"),
            cell_px: 12,
        }
    }

    /// Number of ticks needed to cover the duration at the given cadence
    pub fn total_ticks(&self, cadence: Duration) -> usize {
        let cadence_s = cadence.as_secs_f32();
        if cadence_s <= 0.0 || !self.duration_secs.is_finite() || self.duration_secs <= 0.0
        {
            return 0;
        }
        (self.duration_secs / cadence_s).ceil() as usize
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> PathBuf {
        self.output_dir.join("frames")
    }

    /// Audio file path
    pub fn audio_path(&self) -> PathBuf {
        self.output_dir.join("audio.wav")
    }
}
