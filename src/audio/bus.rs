//! Shared mix bus: sums live tones, applies the delay send and master gain.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use super::delay::FeedbackDelay;
use super::tone::{CompletionFn, ToneSpec, ToneVoice};
use super::AudioOutput;
use crate::error::AudioError;
use crate::params::audio_constants::SAFETY_LIMIT;
use crate::params::AudioConfig;

struct ActiveTone {
    voice: ToneVoice,
    on_complete: Option<CompletionFn>,
}

struct BusState {
    tones: Vec<ActiveTone>,
    delay: FeedbackDelay,
}

/// Mix bus shared between the tick thread (adds tones) and the audio clock
/// (renders them). Completion callbacks run after the bus lock is released.
pub struct MixBus {
    sample_rate: u32,
    master_gain: f32,
    available: AtomicBool,
    state: Mutex<BusState>,
}

impl MixBus {
    pub fn new(config: &AudioConfig, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            master_gain: config.master_gain.max(0.0),
            available: AtomicBool::new(true),
            state: Mutex::new(BusState {
                tones: Vec::new(),
                delay: FeedbackDelay::new(&config.delay, sample_rate),
            }),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Mark the bus (un)usable, e.g. after a device stream error
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Tones currently rendering
    pub fn active_tones(&self) -> usize {
        self.state.lock().tones.len()
    }

    /// Fill an interleaved buffer with `channels` copies of the mono mix
    pub fn render(&self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let finished = {
            let mut state = self.state.lock();
            let BusState { tones, delay } = &mut *state;

            for frame in out.chunks_mut(channels) {
                let dry: f32 = tones.iter_mut().map(|t| t.voice.next_sample()).sum();
                let wet = delay.process(dry);
                // Safety limiter: hard clip to prevent ear damage
                let sample = (wet * self.master_gain).clamp(-SAFETY_LIMIT, SAFETY_LIMIT);
                frame.fill(sample);
            }

            let mut finished = Vec::new();
            tones.retain_mut(|tone| {
                if tone.voice.is_finished() {
                    finished.extend(tone.on_complete.take());
                    false
                } else {
                    true
                }
            });
            finished
        };

        if !finished.is_empty() {
            trace!("Mix bus: {} tones completed", finished.len());
        }
        for on_complete in finished {
            on_complete();
        }
    }
}

impl AudioOutput for MixBus {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn start_tone(&self, tone: ToneSpec, on_complete: CompletionFn) -> Result<(), AudioError> {
        if !self.is_available() {
            return Err(AudioError::Unavailable);
        }
        let voice = ToneVoice::new(&tone, self.sample_rate);
        self.state.lock().tones.push(ActiveTone {
            voice,
            on_complete: Some(on_complete),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{DelayConfig, EnvelopeConfig};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn dry_bus(sample_rate: u32) -> MixBus {
        let config = AudioConfig {
            sample_rate_hz: sample_rate,
            master_gain: 1.0,
            delay: DelayConfig {
                mix: 0.0,
                ..Default::default()
            },
        };
        MixBus::new(&config, sample_rate)
    }

    fn tone(duration_s: f32) -> ToneSpec {
        ToneSpec {
            frequency_hz: 50.0,
            peak_gain: 0.4,
            envelope: EnvelopeConfig {
                attack_s: 0.0,
                release_s: 0.0,
                duration_s,
            },
            detune_cents: 0.0,
            partial_level: 0.0,
        }
    }

    #[test]
    fn test_completion_fires_once_after_envelope() {
        let bus = dry_bus(1000);
        let completed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completed);
        bus.start_tone(
            tone(0.1),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        let mut buffer = vec![0.0; 2 * 64]; // stereo, 64 frames
        bus.render(&mut buffer, 2);
        assert_eq!(completed.load(Ordering::SeqCst), 0);
        assert_eq!(bus.active_tones(), 1);

        bus.render(&mut buffer, 2);
        assert_eq!(completed.load(Ordering::SeqCst), 1);
        assert_eq!(bus.active_tones(), 0);

        bus.render(&mut buffer, 2);
        assert_eq!(completed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_render_duplicates_channels_and_clips() {
        let bus = dry_bus(1000);
        for _ in 0..4 {
            bus.start_tone(tone(1.0), Box::new(|| {})).unwrap();
        }

        let mut buffer = vec![0.0; 2 * 100];
        bus.render(&mut buffer, 2);
        for frame in buffer.chunks(2) {
            assert_eq!(frame[0], frame[1]);
            assert!(frame[0].abs() <= SAFETY_LIMIT);
        }
        // Four in-phase tones at 0.4 would reach 1.6 without the limiter
        assert!(buffer.iter().any(|s| *s == SAFETY_LIMIT));
    }

    #[test]
    fn test_unavailable_bus_rejects_tones() {
        let bus = dry_bus(1000);
        bus.set_available(false);
        let result = bus.start_tone(tone(0.1), Box::new(|| {}));
        assert!(matches!(result, Err(AudioError::Unavailable)));
        assert_eq!(bus.active_tones(), 0);
    }

    #[test]
    fn test_completion_may_touch_bus() {
        // Callbacks run outside the bus lock, so re-entering the bus is fine
        let bus = Arc::new(dry_bus(1000));
        let inner = Arc::clone(&bus);
        bus.start_tone(
            tone(0.01),
            Box::new(move || {
                let _ = inner.active_tones();
            }),
        )
        .unwrap();

        let mut buffer = vec![0.0; 32];
        bus.render(&mut buffer, 1);
        assert_eq!(bus.active_tones(), 0);
    }
}
