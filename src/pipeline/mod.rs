//! The per-tick pipeline: sample, threshold, trigger, render, commit.
//!
//! One tick runs every stage in order on a single thread. Only the live-voice
//! set is shared with the audio clock; everything else is owned here.

mod driver;

pub use driver::{DriverHandle, TickDriver};

use tracing::{debug, warn};

use crate::audio::{TriggerEngine, TriggerReport};
use crate::error::PipelineError;
use crate::frame::{FrameSampler, FrameSource};
use crate::grid::{Grid, ThresholdEngine};
use crate::params::{ControlSurface, GridConfig, ProcessingParams};
use crate::rendering::GridRenderer;

/// Counts for one completed tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub tick: u64,
    pub lit: usize,
    pub activated: usize,
    pub deactivated: usize,
    pub triggers: TriggerReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Source had no frame; grid and voices untouched
    Skipped,
    Completed(TickSummary),
}

pub struct Pipeline {
    source: Box<dyn FrameSource>,
    sampler: FrameSampler,
    threshold: ThresholdEngine,
    trigger: TriggerEngine,
    renderers: Vec<Box<dyn GridRenderer>>,
    controls: ControlSurface,
    ticks: u64,
}

impl Pipeline {
    pub fn new(
        grid: GridConfig,
        source: Box<dyn FrameSource>,
        trigger: TriggerEngine,
        controls: ControlSurface,
    ) -> Self {
        Self {
            source,
            sampler: FrameSampler::new(grid),
            threshold: ThresholdEngine::new(grid),
            trigger,
            renderers: Vec::new(),
            controls,
            ticks: 0,
        }
    }

    pub fn add_renderer(&mut self, renderer: Box<dyn GridRenderer>) {
        self.renderers.push(renderer);
    }

    /// Handle for adjusting parameters from other threads
    pub fn controls(&self) -> ControlSurface {
        self.controls.clone()
    }

    /// Last completed grid
    pub fn grid(&self) -> &Grid {
        self.threshold.previous()
    }

    pub fn trigger(&self) -> &TriggerEngine {
        &self.trigger
    }

    pub fn ticks_completed(&self) -> u64 {
        self.ticks
    }

    /// Run one tick with a fresh parameter snapshot
    pub fn tick(&mut self) -> Result<TickOutcome, PipelineError> {
        let params = self.controls.snapshot();
        self.tick_with(&params)
    }

    /// Advance the source by one cadence step, then tick.
    ///
    /// A source that fails to advance keeps its last frame (or goes not-ready).
    pub fn step_with(&mut self, params: &ProcessingParams) -> Result<TickOutcome, PipelineError> {
        if let Err(e) = self.source.advance(params.cadence) {
            warn!("Frame source advance failed: {}", e);
        }
        self.tick_with(params)
    }

    /// Run one tick against a fixed parameter snapshot.
    ///
    /// `previous` only moves forward after triggers and renderers have seen
    /// this tick's grid, so a failed tick leaves the baseline intact.
    pub fn tick_with(&mut self, params: &ProcessingParams) -> Result<TickOutcome, PipelineError> {
        if !self.source.is_ready() {
            debug!("Frame source not ready, skipping tick");
            return Ok(TickOutcome::Skipped);
        }

        let samples = self.sampler.sample(self.source.as_ref(), params.mirror_enabled)?;
        let transitions = self.threshold.apply(&samples, params)?;

        let grid = self.threshold.current();
        let triggers = self
            .trigger
            .dispatch(&transitions.activated, grid.rows(), params);

        for renderer in &mut self.renderers {
            if let Err(e) = renderer.render(grid, &transitions) {
                warn!("Renderer failed: {}", e);
            }
        }

        let summary = TickSummary {
            tick: self.ticks,
            lit: grid.lit_count(),
            activated: transitions.activated.len(),
            deactivated: transitions.deactivated.len(),
            triggers,
        };

        self.threshold.commit();
        self.ticks += 1;

        debug!(
            "Tick {}: {} lit, +{} -{}, {} voices started",
            summary.tick, summary.lit, summary.activated, summary.deactivated, triggers.started
        );
        Ok(TickOutcome::Completed(summary))
    }
}
