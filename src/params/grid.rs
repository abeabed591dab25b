//! Grid resolution configuration.

use crate::error::ConfigError;

/// Logical resolution of the flip-dot grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    /// Number of columns (cells per row)
    pub cols: usize,

    /// Number of rows (row 0 is the top of the display)
    pub rows: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: 64, // 16:9 at a size that still reads as a dot matrix
            rows: 36,
        }
    }
}

impl GridConfig {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    /// Width / height ratio of the grid
    pub fn aspect_ratio(&self) -> f32 {
        self.cols as f32 / self.rows as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(())
    }
}
