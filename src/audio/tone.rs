//! Per-voice synthesis: envelope-gated, slightly detuned sine pair.
//!
//! Each voice is a fundamental plus an octave partial. The partials are
//! detuned in opposite directions by the voice's random cents offset, and the
//! partial level varies per voice so that many voices near the same pitch do
//! not phase against each other.

use std::f32::consts::TAU;

use crate::params::audio_constants::{ENVELOPE_FLOOR, RELEASE_TARGET_RATIO};
use crate::params::EnvelopeConfig;

/// Called once when a voice's envelope has fully completed
pub type CompletionFn = Box<dyn FnOnce() + Send + 'static>;

/// Everything needed to render one tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub frequency_hz: f32,

    /// Gain reached at the end of the attack
    pub peak_gain: f32,

    pub envelope: EnvelopeConfig,

    /// Detune applied + to the fundamental and - to the partial (cents)
    pub detune_cents: f32,

    /// Octave partial level relative to the fundamental, 0..=1
    pub partial_level: f32,
}

/// Gain as a function of time since the voice started
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    attack_s: f32,
    sustain_end_s: f32,
    duration_s: f32,
    peak: f32,
}

impl Envelope {
    pub fn new(config: &EnvelopeConfig, peak: f32) -> Self {
        let duration_s = config.duration_s.max(0.0);
        let attack_s = config.attack_s.clamp(0.0, duration_s);
        let release_s = config.release_s.clamp(0.0, duration_s - attack_s);
        Self {
            attack_s,
            sustain_end_s: duration_s - release_s,
            duration_s,
            peak,
        }
    }

    pub fn duration_s(&self) -> f32 {
        self.duration_s
    }

    /// Linear attack from near zero, flat sustain, exponential release
    pub fn gain_at(&self, t: f32) -> f32 {
        if t < 0.0 || t >= self.duration_s {
            0.0
        } else if t < self.attack_s {
            ENVELOPE_FLOOR + (self.peak - ENVELOPE_FLOOR) * (t / self.attack_s)
        } else if t < self.sustain_end_s {
            self.peak
        } else {
            let release_s = self.duration_s - self.sustain_end_s;
            let progress = (t - self.sustain_end_s) / release_s;
            self.peak * RELEASE_TARGET_RATIO.powf(progress)
        }
    }
}

/// A sounding tone on the audio clock
#[derive(Debug, Clone)]
pub struct ToneVoice {
    envelope: Envelope,
    sample_rate: f32,
    /// Samples rendered since this voice's own start
    elapsed: u64,
    total_samples: u64,
    phase_fundamental: f32,
    phase_partial: f32,
    inc_fundamental: f32,
    inc_partial: f32,
    partial_level: f32,
}

impl ToneVoice {
    pub fn new(spec: &ToneSpec, sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1) as f32;
        let envelope = Envelope::new(&spec.envelope, spec.peak_gain);
        let detune = 2f32.powf(spec.detune_cents / 1200.0);

        Self {
            total_samples: (envelope.duration_s() * sample_rate).ceil() as u64,
            envelope,
            sample_rate,
            elapsed: 0,
            phase_fundamental: 0.0,
            phase_partial: 0.0,
            inc_fundamental: TAU * spec.frequency_hz * detune / sample_rate,
            inc_partial: TAU * 2.0 * spec.frequency_hz / detune / sample_rate,
            partial_level: spec.partial_level.clamp(0.0, 1.0),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.total_samples
    }

    /// Next mono sample; silence once finished
    pub fn next_sample(&mut self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }

        let t = self.elapsed as f32 / self.sample_rate;
        let gain = self.envelope.gain_at(t);
        let raw = (self.phase_fundamental.sin() + self.partial_level * self.phase_partial.sin())
            / (1.0 + self.partial_level);

        self.phase_fundamental = (self.phase_fundamental + self.inc_fundamental) % TAU;
        self.phase_partial = (self.phase_partial + self.inc_partial) % TAU;
        self.elapsed += 1;

        raw * gain
    }
}
