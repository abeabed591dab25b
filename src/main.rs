//! flipsonic - live video as a flip-dot grid that plays itself
//!
//! Bright cells flip on, and every cell that flips on may ring a short tone
//! pitched by its row.

use std::io::stdout;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use flipsonic::audio::{AudioOutput, AudioSystem, MixBus, NullOutput, TriggerEngine};
use flipsonic::cli::Args;
use flipsonic::frame::open_source;
use flipsonic::params::{AudioConfig, ControlSurface};
use flipsonic::pipeline::{Pipeline, TickDriver};
use flipsonic::recording::RecordingSession;
use flipsonic::rendering::TerminalRenderer;

fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the terminal display
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let grid = args.grid_config();
    let trigger_config = args.trigger_config();
    let audio_config = AudioConfig::default();
    grid.validate().context("Invalid grid")?;
    trigger_config.validate().context("Invalid voice settings")?;
    audio_config.validate().context("Invalid audio settings")?;

    // A source that cannot be opened leaves the pipeline idle
    let source = match open_source(&args.source, args.pattern_seed()) {
        Ok(source) => source,
        Err(e) => {
            error!("Could not open frame source '{}': {}", args.source, e);
            return Err(e).context("Frame source unavailable");
        }
    };

    let controls = ControlSurface::new(args.processing_params());

    if let Some(recording) = args.recording_config() {
        let bus = Arc::new(MixBus::new(&audio_config, audio_config.sample_rate_hz));
        let output: Arc<dyn AudioOutput> = bus.clone();
        let pipeline = Pipeline::new(
            grid,
            source,
            TriggerEngine::new(trigger_config, output),
            controls,
        );

        let summary = RecordingSession::new(recording, bus)
            .run(pipeline)
            .context("Recording failed")?;
        info!(
            "Wrote {} frames ({} skipped), {} voices",
            summary.frames_written, summary.skipped_ticks, summary.voices_started
        );
        return Ok(());
    }

    // Live mode: keep the stream alive for the whole run
    let audio = match AudioSystem::new(&audio_config) {
        Ok(audio) => Some(audio),
        Err(e) => {
            warn!("Audio disabled: {}", e);
            None
        }
    };
    let output: Arc<dyn AudioOutput> = match &audio {
        Some(audio) => audio.bus() as Arc<dyn AudioOutput>,
        None => Arc::new(NullOutput) as Arc<dyn AudioOutput>,
    };

    let mut pipeline = Pipeline::new(
        grid,
        source,
        TriggerEngine::new(trigger_config, output),
        controls,
    );
    if !args.no_display {
        pipeline.add_renderer(Box::new(TerminalRenderer::new(stdout())));
    }

    info!(
        "Running {}x{} grid every {}ms",
        grid.cols, grid.rows, args.cadence_ms
    );
    let driver = TickDriver::start(pipeline);

    let pipeline = match args.live_duration() {
        Some(duration) => {
            thread::sleep(duration);
            driver.stop()
        }
        None => driver.join(),
    };

    if let Some(pipeline) = pipeline {
        info!("Stopped after {} ticks", pipeline.ticks_completed());
    }
    drop(audio);
    Ok(())
}
