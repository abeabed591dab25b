//! Mix bus and offline rendering configuration.

use crate::error::ConfigError;

/// Feedback delay send on the mix bus
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayConfig {
    /// Delay time (seconds)
    pub time_s: f32,

    /// Fraction of the delayed signal fed back, 0..0.95
    pub feedback: f32,

    /// Wet level added to the dry mix (0 = bypass)
    pub mix: f32,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            time_s: 0.3,
            feedback: 0.35,
            mix: 0.25,
        }
    }
}

/// Shared mix bus configuration
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Sample rate used when no device dictates one (offline recording)
    pub sample_rate_hz: u32,

    /// Single master gain stage applied to the voice sum
    pub master_gain: f32,

    pub delay: DelayConfig,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            master_gain: 0.8,
            delay: DelayConfig::default(),
        }
    }
}

impl AudioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::SampleRate);
        }
        Ok(())
    }
}

/// Audio constants (compile-time)
pub mod audio_constants {
    /// Hard clip applied to every output sample to prevent ear damage
    pub const SAFETY_LIMIT: f32 = 0.5;

    /// Envelope start gain (exact zero is avoided for the exponential segment)
    pub const ENVELOPE_FLOOR: f32 = 1.0e-4;

    /// Gain ratio reached at the end of the release segment
    pub const RELEASE_TARGET_RATIO: f32 = 1.0e-3;

    /// Longest supported delay send (seconds)
    pub const MAX_DELAY_S: f32 = 2.0;
}
