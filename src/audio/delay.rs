//! Mono feedback delay used as the mix bus send.

use crate::params::audio_constants::MAX_DELAY_S;
use crate::params::DelayConfig;

/// Single-tap feedback delay with a fixed integer delay time
pub struct FeedbackDelay {
    buffer: Vec<f32>,
    write_pos: usize,
    delay_samples: usize,
    /// Feedback amount (0.0 - 0.95)
    feedback: f32,
    /// Wet level added to the dry signal
    mix: f32,
}

impl FeedbackDelay {
    pub fn new(config: &DelayConfig, sample_rate: u32) -> Self {
        let sr = sample_rate.max(1) as f32;
        let max_samples = (sr * MAX_DELAY_S) as usize;
        let delay_samples = ((config.time_s.clamp(0.0, MAX_DELAY_S) * sr).round() as usize)
            .clamp(1, max_samples.max(1));

        Self {
            buffer: vec![0.0; delay_samples],
            write_pos: 0,
            delay_samples,
            feedback: config.feedback.clamp(0.0, 0.95),
            mix: config.mix.max(0.0),
        }
    }

    pub fn is_bypassed(&self) -> bool {
        self.mix <= 0.0
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Process one mono sample: dry + mix * delayed
    pub fn process(&mut self, input: f32) -> f32 {
        if self.is_bypassed() {
            return input;
        }

        // Buffer length equals the delay, so the slot about to be written holds
        // the sample from exactly `delay_samples` ago
        let delayed = self.buffer[self.write_pos];
        self.buffer[self.write_pos] = input + delayed * self.feedback;
        self.write_pos = (self.write_pos + 1) % self.delay_samples;

        input + delayed * self.mix
    }
}
