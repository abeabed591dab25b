//! Downsampling of the newest frame to the grid's logical resolution.

use image::imageops::{self, FilterType};
use image::RgbImage;

use super::FrameSource;
use crate::error::SourceError;
use crate::params::GridConfig;

/// Flat RGB samples, one per grid cell, indexed by `row * cols + col`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    pub cols: usize,
    pub rows: usize,
    pub samples: Vec<[u8; 3]>,
}

impl SampleBuffer {
    /// Buffer with every cell set to the same sample
    pub fn uniform(cols: usize, rows: usize, rgb: [u8; 3]) -> Self {
        Self {
            cols,
            rows,
            samples: vec![rgb; cols * rows],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> [u8; 3] {
        self.samples[row * self.cols + col]
    }
}

/// Pure transform from a frame source to a grid-sized sample buffer
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    grid: GridConfig,
}

impl FrameSampler {
    pub fn new(grid: GridConfig) -> Self {
        Self { grid }
    }

    /// Sample the source's newest frame.
    ///
    /// Returns [`SourceError::NotReady`] when the source has nothing to offer;
    /// callers must skip the tick rather than sample stale data.
    pub fn sample(
        &self,
        source: &dyn FrameSource,
        mirror: bool,
    ) -> Result<SampleBuffer, SourceError> {
        if !source.is_ready() {
            return Err(SourceError::NotReady);
        }
        let frame = source.current_frame().ok_or(SourceError::NotReady)?;
        if frame.width() == 0 || frame.height() == 0 {
            return Err(SourceError::NotReady);
        }
        Ok(self.sample_frame(frame, mirror))
    }

    /// Crop to the grid aspect, optionally mirror, then downsample
    pub fn sample_frame(&self, frame: &RgbImage, mirror: bool) -> SampleBuffer {
        let (cols, rows) = (self.grid.cols, self.grid.rows);
        let (x, y, width, height) = cover_crop(frame.width(), frame.height(), self.grid.aspect_ratio());

        let mut cropped = imageops::crop_imm(frame, x, y, width, height).to_image();
        if mirror {
            cropped = imageops::flip_horizontal(&cropped);
        }

        let resized = imageops::resize(&cropped, cols as u32, rows as u32, FilterType::Triangle);
        SampleBuffer {
            cols,
            rows,
            samples: resized.pixels().map(|p| p.0).collect(),
        }
    }
}

/// Largest centered region of a `width x height` frame with the given aspect ratio
fn cover_crop(width: u32, height: u32, aspect: f32) -> (u32, u32, u32, u32) {
    let frame_aspect = width as f32 / height as f32;
    if frame_aspect > aspect {
        let crop_width = ((height as f32 * aspect).round() as u32).clamp(1, width);
        ((width - crop_width) / 2, 0, crop_width, height)
    } else {
        let crop_height = ((width as f32 / aspect).round() as u32).clamp(1, height);
        (0, (height - crop_height) / 2, width, crop_height)
    }
}
