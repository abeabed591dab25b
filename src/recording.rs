//! Offline recording: tick the pipeline as fast as possible, writing one PNG
//! per tick and the mix bus output to a stereo float WAV.
//!
//! Runs without an audio device. With a seeded trigger engine and a
//! deterministic source, two runs produce identical output.

use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

use tracing::info;

use crate::audio::MixBus;
use crate::error::RecordingError;
use crate::params::RecordingConfig;
use crate::pipeline::{Pipeline, TickOutcome};
use crate::rendering::PngFrameRenderer;

const WAV_CHANNELS: u16 = 2;

/// What a finished recording contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingSummary {
    pub ticks: usize,
    pub frames_written: usize,
    pub skipped_ticks: usize,
    pub audio_frames: usize,
    pub voices_started: usize,
}

pub struct RecordingSession {
    config: RecordingConfig,
    bus: Arc<MixBus>,
}

impl RecordingSession {
    /// `bus` must be the same output the pipeline's trigger engine writes to
    pub fn new(config: RecordingConfig, bus: Arc<MixBus>) -> Self {
        Self { config, bus }
    }

    pub fn config(&self) -> &RecordingConfig {
        &self.config
    }

    /// Record `duration_secs` worth of ticks at the pipeline's cadence
    pub fn run(&self, mut pipeline: Pipeline) -> Result<RecordingSummary, RecordingError> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        pipeline.add_renderer(Box::new(PngFrameRenderer::new(
            self.config.frames_dir(),
            self.config.cell_px,
        )?));

        let spec = hound::WavSpec {
            channels: WAV_CHANNELS,
            sample_rate: self.bus.sample_rate(),
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer: hound::WavWriter<BufWriter<File>> =
            hound::WavWriter::create(self.config.audio_path(), spec)?;

        let controls = pipeline.controls();
        let total_ticks = self.config.total_ticks(controls.snapshot().cadence);
        info!(
            "Recording {} ticks to {}",
            total_ticks,
            self.config.output_dir.display()
        );

        let mut summary = RecordingSummary {
            ticks: total_ticks,
            frames_written: 0,
            skipped_ticks: 0,
            audio_frames: 0,
            voices_started: 0,
        };
        let mut block = Vec::new();

        for tick in 0..total_ticks {
            let params = controls.snapshot();
            let outcome = if tick == 0 {
                pipeline.tick_with(&params)?
            } else {
                pipeline.step_with(&params)?
            };
            match outcome {
                TickOutcome::Completed(tick_summary) => {
                    summary.frames_written += 1;
                    summary.voices_started += tick_summary.triggers.started;
                }
                TickOutcome::Skipped => summary.skipped_ticks += 1,
            }

            // Audio for the span of wall time this tick would have covered
            let frames =
                (self.bus.sample_rate() as f64 * params.cadence.as_secs_f64()).round() as usize;
            block.clear();
            block.resize(frames * WAV_CHANNELS as usize, 0.0);
            self.bus.render(&mut block, WAV_CHANNELS as usize);
            for &sample in &block {
                writer.write_sample(sample)?;
            }
            summary.audio_frames += frames;

            if tick > 0 && tick % 100 == 0 {
                info!("Recorded {}/{} ticks", tick, total_ticks);
            }
        }

        writer.finalize()?;
        info!(
            "Recording complete: {} frames, {:.1}s of audio",
            summary.frames_written,
            summary.audio_frames as f64 / self.bus.sample_rate() as f64
        );
        Ok(summary)
    }
}
