//! Trigger probability, pitch range and voice envelope configuration.

use crate::error::ConfigError;

/// Voice envelope timing, measured from each voice's own first sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    /// Linear ramp from near-zero to peak gain (seconds)
    pub attack_s: f32,

    /// Exponential decay to near-silence before the end of the voice (seconds)
    pub release_s: f32,

    /// Total voice lifetime including attack and release (seconds)
    pub duration_s: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack_s: 0.01,
            release_s: 0.45,
            duration_s: 0.6,
        }
    }
}

impl EnvelopeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attack_s < 0.0
            || self.release_s < 0.0
            || self.attack_s + self.release_s > self.duration_s
        {
            return Err(ConfigError::Envelope(
                self.attack_s + self.release_s,
                self.duration_s,
            ));
        }
        Ok(())
    }
}

/// How activated cells become voices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerConfig {
    /// Chance that an activated cell is sonified, 0..=1.
    /// Observed aesthetic range: 0.70 - 0.85
    pub trigger_probability: f32,

    /// Pitch of the bottom of the grid (Hz)
    pub min_freq_hz: f32,

    /// Pitch of row 0, the top of the grid (Hz)
    pub max_freq_hz: f32,

    /// Per-voice random detune range (± cents)
    pub detune_cents: f32,

    /// Voice peak gain at volume 1.0 (before the bus master gain)
    pub voice_gain: f32,

    pub envelope: EnvelopeConfig,

    /// RNG seed for trigger decisions and voice variation (None = entropy)
    pub seed: Option<u64>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            trigger_probability: 0.8,
            min_freq_hz: 110.0,  // A2
            max_freq_hz: 1760.0, // A6, four octaves above
            detune_cents: 6.0,
            voice_gain: 0.3,
            envelope: EnvelopeConfig::default(),
            seed: None,
        }
    }
}

impl TriggerConfig {
    /// Copy with user-supplied numbers forced into range.
    ///
    /// Non-finite values fall back to the defaults.
    pub fn coerced(self) -> Self {
        let defaults = Self::default();
        Self {
            trigger_probability: if self.trigger_probability.is_finite() {
                self.trigger_probability.clamp(0.0, 1.0)
            } else {
                defaults.trigger_probability
            },
            detune_cents: if self.detune_cents.is_finite() {
                self.detune_cents.abs()
            } else {
                defaults.detune_cents
            },
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.trigger_probability) {
            return Err(ConfigError::TriggerProbability(self.trigger_probability));
        }
        if !self.detune_cents.is_finite() {
            return Err(ConfigError::Detune(self.detune_cents));
        }
        if !(self.min_freq_hz > 0.0 && self.min_freq_hz < self.max_freq_hz) {
            return Err(ConfigError::FrequencyRange {
                min_hz: self.min_freq_hz,
                max_hz: self.max_freq_hz,
            });
        }
        self.envelope.validate()
    }
}
