//! flipsonic - a frame-to-grid-to-sound pipeline
//!
//! Video frames are sampled down to a small binary grid, and cells that flip
//! on ring short tones pitched by their row.

pub mod audio;
pub mod cli;
pub mod error;
pub mod frame;
pub mod grid;
pub mod params;
pub mod pipeline;
pub mod recording;
pub mod rendering;
