//! Command-line argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::params::{GridConfig, ProcessingParams, RecordingConfig, TriggerConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "flipsonic")]
#[command(about = "Video to flip-dot grid to sound", long_about = None)]
pub struct Args {
    /// Frame source: `pattern`, an image file, or a directory of frames
    #[arg(long, value_name = "SOURCE", default_value = "pattern")]
    pub source: String,

    /// Grid columns
    #[arg(long, default_value_t = GridConfig::default().cols)]
    pub cols: usize,

    /// Grid rows
    #[arg(long, default_value_t = GridConfig::default().rows)]
    pub rows: usize,

    /// Brightness threshold (0-255); a cell is lit strictly above it
    #[arg(long, default_value_t = 128.0)]
    pub threshold: f32,

    /// Brightness offset added before contrast
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub brightness: f32,

    /// Contrast in percent (100 = unchanged)
    #[arg(long, default_value_t = 100.0)]
    pub contrast: f32,

    /// Mirror the frame horizontally
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub mirror: bool,

    /// Disable sound triggering
    #[arg(long)]
    pub mute: bool,

    /// Output volume (0-1)
    #[arg(long, default_value_t = 0.5)]
    pub volume: f32,

    /// Maximum simultaneously sounding voices
    #[arg(long, default_value_t = 12)]
    pub max_voices: usize,

    /// Tick period in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub cadence_ms: u64,

    /// Chance that an activated cell sounds (0-1)
    #[arg(long, default_value_t = 0.8)]
    pub trigger_probability: f32,

    /// Seed for trigger decisions, voice timbre, and the test pattern
    #[arg(long)]
    pub seed: Option<u64>,

    /// Record offline to PNG frames + WAV (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Output directory for recordings
    #[arg(long, value_name = "DIR", default_value = "recording")]
    pub output: PathBuf,

    /// Stop a live run after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<f32>,

    /// Do not draw the grid in the terminal
    #[arg(long)]
    pub no_display: bool,
}

impl Args {
    pub fn grid_config(&self) -> GridConfig {
        GridConfig::new(self.cols, self.rows)
    }

    /// Initial live parameters (coerced into their domains)
    pub fn processing_params(&self) -> ProcessingParams {
        ProcessingParams {
            threshold: self.threshold,
            brightness: self.brightness,
            contrast: self.contrast,
            mirror_enabled: self.mirror,
            sound_enabled: !self.mute,
            volume: self.volume,
            max_voices: self.max_voices,
            cadence: Duration::from_millis(self.cadence_ms),
        }
        .coerced()
    }

    pub fn trigger_config(&self) -> TriggerConfig {
        TriggerConfig {
            trigger_probability: self.trigger_probability,
            seed: self.seed,
            ..Default::default()
        }
        .coerced()
    }

    /// Test-pattern seed derived from `--seed`
    pub fn pattern_seed(&self) -> u32 {
        self.seed.map(|seed| seed as u32).unwrap_or(42)
    }

    /// Recording configuration if recording mode is enabled
    pub fn recording_config(&self) -> Option<RecordingConfig> {
        self.record.map(|duration| RecordingConfig {
            output_dir: self.output.clone(),
            ..RecordingConfig::new(duration)
        })
    }

    /// Live run length, if bounded
    pub fn live_duration(&self) -> Option<Duration> {
        self.duration
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("flipsonic").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.source, "pattern");
        assert_eq!(args.grid_config(), GridConfig::default());
        assert_eq!(args.processing_params(), ProcessingParams::default());
        assert!(args.recording_config().is_none());
        assert!(args.live_duration().is_none());
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "--source",
            "frames/",
            "--cols",
            "16",
            "--rows",
            "9",
            "--brightness",
            "-20",
            "--mirror",
            "false",
            "--mute",
            "--cadence-ms",
            "50",
            "--seed",
            "5",
        ]);
        let params = args.processing_params();
        assert_eq!(args.grid_config(), GridConfig::new(16, 9));
        assert_eq!(params.brightness, -20.0);
        assert!(!params.mirror_enabled);
        assert!(!params.sound_enabled);
        assert_eq!(params.cadence, Duration::from_millis(50));
        assert_eq!(args.trigger_config().seed, Some(5));
        assert_eq!(args.pattern_seed(), 5);
    }

    #[test]
    fn test_out_of_range_values_are_coerced() {
        let args = parse(&[
            "--cadence-ms",
            "1",
            "--volume",
            "3",
            "--trigger-probability",
            "1.5",
        ]);
        let params = args.processing_params();
        assert_eq!(params.cadence, ProcessingParams::MIN_CADENCE);
        assert_eq!(params.volume, 1.0);
        assert_eq!(args.trigger_config().trigger_probability, 1.0);
    }

    #[test]
    fn test_non_finite_values_fall_back_to_defaults() {
        let args = parse(&[
            "--trigger-probability",
            "NaN",
            "--threshold",
            "NaN",
            "--record",
            "inf",
        ]);
        let trigger = args.trigger_config();
        assert_eq!(trigger.trigger_probability, 0.8);
        assert!(trigger.validate().is_ok());
        assert_eq!(args.processing_params().threshold, 128.0);

        let config = args.recording_config().unwrap();
        assert_eq!(config.total_ticks(Duration::from_millis(100)), 0);
    }

    #[test]
    fn test_recording_config() {
        let args = parse(&["--record", "3", "--output", "out"]);
        let config = args.recording_config().unwrap();
        assert_eq!(config.duration_secs, 3.0);
        assert_eq!(config.audio_path(), PathBuf::from("out").join("audio.wav"));
    }
}
