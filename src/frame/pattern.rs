//! Animated noise test pattern used as a synthetic camera.
//!
//! Produces slowly drifting bright and dark regions so the grid sees a
//! steady trickle of transitions without any capture hardware.

use std::time::Duration;

use image::{Rgb, RgbImage};
use noise::{NoiseFn, Perlin};

use super::FrameSource;
use crate::error::SourceError;

/// Test pattern parameters
#[derive(Debug, Clone)]
pub struct PatternConfig {
    /// Generated frame width (pixels)
    pub width: u32,

    /// Generated frame height (pixels)
    pub height: u32,

    /// Spatial frequency (noise cycles per pixel)
    pub spatial_scale: f64,

    /// Animation speed (noise units per second)
    pub drift_speed: f64,

    /// Gain applied to the raw noise before mapping to 0..255
    pub contrast: f64,

    /// Perlin noise seed
    pub seed: u32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 180,
            spatial_scale: 0.015,
            drift_speed: 0.4,
            contrast: 1.6, // Perlin output rarely leaves ±0.7
            seed: 42,
        }
    }
}

/// Perlin-noise frame generator with its own clock
pub struct TestPatternSource {
    config: PatternConfig,
    perlin: Perlin,
    time_s: f64,
    frame: RgbImage,
}

impl TestPatternSource {
    pub fn new(config: PatternConfig) -> Self {
        let perlin = Perlin::new(config.seed);
        let mut source = Self {
            frame: RgbImage::new(config.width, config.height),
            config,
            perlin,
            time_s: 0.0,
        };
        source.render();
        source
    }

    fn render(&mut self) {
        let scale = self.config.spatial_scale;
        let t = self.time_s * self.config.drift_speed;
        let contrast = self.config.contrast;
        let perlin = &self.perlin;

        for (x, y, pixel) in self.frame.enumerate_pixels_mut() {
            let value = perlin.get([x as f64 * scale, y as f64 * scale, t]);
            let shade = ((value * contrast) * 0.5 + 0.5).clamp(0.0, 1.0) * 255.0;
            *pixel = Rgb([shade as u8; 3]);
        }
    }
}

impl FrameSource for TestPatternSource {
    fn is_ready(&self) -> bool {
        true
    }

    fn current_frame(&self) -> Option<&RgbImage> {
        Some(&self.frame)
    }

    fn advance(&mut self, dt: Duration) -> Result<(), SourceError> {
        self.time_s += dt.as_secs_f64();
        self.render();
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "noise test pattern {}x{} (seed {})",
            self.config.width, self.config.height, self.config.seed
        )
    }
}
