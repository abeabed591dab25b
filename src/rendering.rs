//! Renderer collaborators: terminal dot matrix and PNG frame dumps.
//!
//! Renderers only ever see a completed tick's grid. Transitions are passed
//! along so just-flipped dots can be highlighted; they are a derived view.

use std::io::Write;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use crate::error::RenderError;
use crate::grid::{CellKey, Grid, Transitions};

/// Lit dot
const DOT_ON: Rgb<u8> = Rgb([255, 214, 10]);
/// Dot flipped on this tick
const DOT_FLASH: Rgb<u8> = Rgb([255, 255, 255]);
/// Unlit dot
const DOT_OFF: Rgb<u8> = Rgb([34, 34, 34]);
/// Panel background
const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Receives the completed grid once per tick
pub trait GridRenderer: Send {
    fn render(&mut self, grid: &Grid, transitions: &Transitions) -> Result<(), RenderError>;
}

/// Draws the grid as text, redrawing in place with ANSI cursor homing
pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    cleared: bool,
    buffer: String,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            cleared: false,
            buffer: String::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> GridRenderer for TerminalRenderer<W> {
    fn render(&mut self, grid: &Grid, transitions: &Transitions) -> Result<(), RenderError> {
        self.buffer.clear();
        if !self.cleared {
            self.buffer.push_str("\x1b[2J");
            self.cleared = true;
        }
        self.buffer.push_str("\x1b[H");

        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let glyph = if !grid.get(row, col) {
                    '·'
                } else if transitions
                    .activated
                    .binary_search(&CellKey::new(row, col))
                    .is_ok()
                {
                    '◉'
                } else {
                    '●'
                };
                self.buffer.push(glyph);
            }
            self.buffer.push('\n');
        }
        self.buffer.push_str(&format!(
            "lit {:>5}  +{:<4} -{:<4}\n",
            grid.lit_count(),
            transitions.activated.len(),
            transitions.deactivated.len()
        ));

        self.out.write_all(self.buffer.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Rasterize the grid as round dots, `cell_px` pixels per cell
pub fn draw_dots(grid: &Grid, transitions: &Transitions, cell_px: u32) -> RgbImage {
    let cell_px = cell_px.max(1);
    let width = grid.cols() as u32 * cell_px;
    let height = grid.rows() as u32 * cell_px;

    let mut flashing = vec![false; grid.len()];
    for key in &transitions.activated {
        flashing[grid.index(key.row, key.col)] = true;
    }

    let center = (cell_px as f32 - 1.0) / 2.0;
    let radius = cell_px as f32 * 0.42;

    RgbImage::from_fn(width, height, |x, y| {
        let (col, row) = ((x / cell_px) as usize, (y / cell_px) as usize);
        let dx = (x % cell_px) as f32 - center;
        let dy = (y % cell_px) as f32 - center;
        if dx * dx + dy * dy > radius * radius {
            return BACKGROUND;
        }

        let index = grid.index(row, col);
        if flashing[index] {
            DOT_FLASH
        } else if grid.cells()[index] {
            DOT_ON
        } else {
            DOT_OFF
        }
    })
}

/// Writes `frame_NNNNN.png` into a directory every tick
pub struct PngFrameRenderer {
    frames_dir: PathBuf,
    cell_px: u32,
    frame_num: usize,
}

impl PngFrameRenderer {
    /// Create the renderer; the directory is created if missing
    pub fn new<P: AsRef<Path>>(frames_dir: P, cell_px: u32) -> Result<Self, RenderError> {
        std::fs::create_dir_all(frames_dir.as_ref())?;
        Ok(Self {
            frames_dir: frames_dir.as_ref().to_path_buf(),
            cell_px,
            frame_num: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.frame_num
    }
}

impl GridRenderer for PngFrameRenderer {
    fn render(&mut self, grid: &Grid, transitions: &Transitions) -> Result<(), RenderError> {
        let frame_path = self
            .frames_dir
            .join(format!("frame_{:05}.png", self.frame_num));
        draw_dots(grid, transitions, self.cell_px).save(&frame_path)?;
        self.frame_num += 1;
        Ok(())
    }
}
