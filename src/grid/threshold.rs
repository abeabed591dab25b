//! Brightness/contrast adjustment, binary threshold and grid diffing.

use tracing::trace;

use super::{Grid, Transitions};
use crate::error::PipelineError;
use crate::frame::SampleBuffer;
use crate::params::{GridConfig, ProcessingParams};

/// Mid-grey pivot for contrast
const MID_GREY: f32 = 128.0;

/// Adjusted luma of one RGB sample, clamped to 0..=255.
///
/// Luma is the unweighted channel mean. Brightness is added first, then
/// contrast (percent) scales the distance from mid-grey.
pub fn adjusted_luma(rgb: [u8; 3], brightness: f32, contrast: f32) -> f32 {
    let luma = (rgb[0] as f32 + rgb[1] as f32 + rgb[2] as f32) / 3.0;
    let brightened = luma + brightness;
    let contrasted = (brightened - MID_GREY) * (contrast / 100.0) + MID_GREY;
    contrasted.clamp(0.0, 255.0)
}

/// Owns the `current` and `previous` grids.
///
/// `apply` rebuilds `current` and reports transitions against `previous`;
/// `previous` only moves forward on `commit`, once the tick's consumers are done.
#[derive(Debug, Clone)]
pub struct ThresholdEngine {
    current: Grid,
    previous: Grid,
}

impl ThresholdEngine {
    pub fn new(grid: GridConfig) -> Self {
        Self {
            current: Grid::new(grid.cols, grid.rows),
            previous: Grid::new(grid.cols, grid.rows),
        }
    }

    pub fn current(&self) -> &Grid {
        &self.current
    }

    pub fn previous(&self) -> &Grid {
        &self.previous
    }

    /// Threshold the samples into `current` and diff against `previous`
    pub fn apply(
        &mut self,
        samples: &SampleBuffer,
        params: &ProcessingParams,
    ) -> Result<Transitions, PipelineError> {
        if samples.cols != self.current.cols()
            || samples.rows != self.current.rows()
            || samples.samples.len() != self.current.len()
        {
            return Err(PipelineError::GridMismatch {
                cols: self.current.cols(),
                rows: self.current.rows(),
                got_cols: samples.cols,
                got_rows: samples.rows,
            });
        }

        for (cell, rgb) in self.current.cells_mut().iter_mut().zip(&samples.samples) {
            *cell = adjusted_luma(*rgb, params.brightness, params.contrast) > params.threshold;
        }

        let transitions = self.current.diff(&self.previous);
        trace!(
            "Threshold: {} lit, +{} -{}",
            self.current.lit_count(),
            transitions.activated.len(),
            transitions.deactivated.len()
        );
        Ok(transitions)
    }

    /// Make the completed `current` grid the baseline for the next tick
    pub fn commit(&mut self) {
        self.previous.cells_mut().copy_from_slice(self.current.cells());
    }
}
