//! Sonic trigger engine: activated cells to pitched voices, bounded pool.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tracing::{debug, trace};

use super::{AudioOutput, ToneSpec};
use crate::grid::CellKey;
use crate::params::{ProcessingParams, TriggerConfig};

/// Frequency for a row, exponentially interpolated so each row is an equal
/// musical interval. Row 0 (top) maps to `max_hz`.
pub fn row_frequency(row: usize, rows: usize, min_hz: f32, max_hz: f32) -> f32 {
    if rows == 0 {
        return max_hz;
    }
    let normalized = 1.0 - row as f32 / rows as f32;
    min_hz * (max_hz / min_hz).powf(normalized)
}

/// What happened to the activated cells of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerReport {
    /// Activated cells looked at
    pub considered: usize,
    /// Lost the trigger-probability draw
    pub suppressed: usize,
    /// Key already had a live voice
    pub already_sounding: usize,
    /// Pool was full
    pub dropped: usize,
    /// Voices started
    pub started: usize,
    /// Output rejected the tone
    pub failed: usize,
}

/// Owns the live-voice set and decides which activations become voices.
///
/// The live set is shared with completion callbacks running on the audio
/// clock; they only ever remove keys.
pub struct TriggerEngine {
    config: TriggerConfig,
    output: Arc<dyn AudioOutput>,
    live: Arc<Mutex<HashSet<CellKey>>>,
    rng: SmallRng,
}

impl TriggerEngine {
    pub fn new(config: TriggerConfig, output: Arc<dyn AudioOutput>) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            config,
            output,
            live: Arc::new(Mutex::new(HashSet::new())),
            rng,
        }
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub fn live_voice_count(&self) -> usize {
        self.live.lock().len()
    }

    pub fn is_sounding(&self, key: CellKey) -> bool {
        self.live.lock().contains(&key)
    }

    /// Turn this tick's activated cells into voices.
    ///
    /// Does nothing at all when sound is disabled or the output is unavailable.
    pub fn dispatch(
        &mut self,
        activated: &[CellKey],
        rows: usize,
        params: &ProcessingParams,
    ) -> TriggerReport {
        let mut report = TriggerReport::default();
        if !params.sound_enabled || !self.output.is_available() {
            return report;
        }

        for &key in activated {
            report.considered += 1;

            if self.rng.gen::<f32>() >= self.config.trigger_probability {
                report.suppressed += 1;
                continue;
            }

            {
                let mut live = self.live.lock();
                if live.contains(&key) {
                    report.already_sounding += 1;
                    continue;
                }
                if live.len() >= params.max_voices {
                    report.dropped += 1;
                    continue;
                }
                live.insert(key);
            }

            let tone = self.tone_for(key, rows, params.volume);
            let live = Arc::clone(&self.live);
            let on_complete = Box::new(move || {
                live.lock().remove(&key);
            });

            match self.output.start_tone(tone, on_complete) {
                Ok(()) => {
                    trace!(
                        "Voice started at ({}, {}): {:.1} Hz",
                        key.row,
                        key.col,
                        tone.frequency_hz
                    );
                    report.started += 1;
                }
                Err(e) => {
                    debug!("Voice for ({}, {}) rejected: {}", key.row, key.col, e);
                    self.live.lock().remove(&key);
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Tone for a cell with this voice's random detune and timbre
    fn tone_for(&mut self, key: CellKey, rows: usize, volume: f32) -> ToneSpec {
        let spread = self.config.detune_cents.abs();
        ToneSpec {
            frequency_hz: row_frequency(
                key.row,
                rows,
                self.config.min_freq_hz,
                self.config.max_freq_hz,
            ),
            peak_gain: volume * self.config.voice_gain,
            envelope: self.config.envelope,
            detune_cents: self.rng.gen_range(-spread..=spread),
            partial_level: self.rng.gen_range(0.1..0.35),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::RecordingOutput;
    use crate::audio::NullOutput;

    fn engine_with(probability: f32, output: Arc<RecordingOutput>) -> TriggerEngine {
        let config = TriggerConfig {
            trigger_probability: probability,
            seed: Some(1234),
            ..Default::default()
        };
        TriggerEngine::new(config, output)
    }

    fn params(max_voices: usize) -> ProcessingParams {
        ProcessingParams {
            max_voices,
            ..Default::default()
        }
    }

    fn all_cells(cols: usize, rows: usize) -> Vec<CellKey> {
        (0..rows)
            .flat_map(|row| (0..cols).map(move |col| CellKey::new(row, col)))
            .collect()
    }

    #[test]
    fn test_row_frequency_endpoints() {
        assert!((row_frequency(0, 10, 100.0, 1600.0) - 1600.0).abs() < 0.01);
        // Last row sits one row-step above the minimum
        let last = row_frequency(9, 10, 100.0, 1600.0);
        assert!((last - 100.0 * 16f32.powf(0.1)).abs() < 0.01);
    }

    #[test]
    fn test_row_frequency_equal_intervals() {
        let ratios: Vec<f32> = (0..7)
            .map(|row| row_frequency(row, 8, 110.0, 880.0) / row_frequency(row + 1, 8, 110.0, 880.0))
            .collect();
        for ratio in &ratios {
            assert!((ratio - ratios[0]).abs() < 1e-4);
        }
    }

    #[test]
    fn test_row_frequency_monotonic() {
        let rows = 48;
        for row in 0..rows - 1 {
            assert!(
                row_frequency(row, rows, 80.0, 2000.0) >= row_frequency(row + 1, rows, 80.0, 2000.0)
            );
        }
    }

    #[test]
    fn test_single_voice_limit_drops_second_trigger() {
        let output = Arc::new(RecordingOutput::new());
        let mut engine = engine_with(1.0, Arc::clone(&output));

        let report = engine.dispatch(&[CellKey::new(0, 0), CellKey::new(1, 1)], 4, &params(1));

        assert_eq!(report.started, 1);
        assert_eq!(report.dropped, 1);
        assert_eq!(output.started_count(), 1);
        assert_eq!(engine.live_voice_count(), 1);
    }

    #[test]
    fn test_pool_bound_holds_when_everything_activates() {
        let output = Arc::new(RecordingOutput::new());
        let mut engine = engine_with(1.0, Arc::clone(&output));
        let cells = all_cells(32, 18);

        for tick in 0..5 {
            let report = engine.dispatch(&cells, 18, &params(8));
            assert!(engine.live_voice_count() <= 8);
            if tick == 0 {
                assert_eq!(report.started, 8);
                assert_eq!(report.dropped, cells.len() - 8);
            }
            // Half the ticks, let the audio clock catch up
            if tick % 2 == 1 {
                output.complete_all();
                assert_eq!(engine.live_voice_count(), 0);
            }
        }
        assert!(output.started_count() <= 8 * 5);
    }

    #[test]
    fn test_no_retrigger_while_sounding() {
        let output = Arc::new(RecordingOutput::new());
        let mut engine = engine_with(1.0, Arc::clone(&output));
        let key = CellKey::new(2, 3);

        assert_eq!(engine.dispatch(&[key], 4, &params(10)).started, 1);
        let again = engine.dispatch(&[key], 4, &params(10));
        assert_eq!(again.started, 0);
        assert_eq!(again.already_sounding, 1);
        assert!(engine.is_sounding(key));

        output.complete_all();
        assert!(!engine.is_sounding(key));
        assert_eq!(engine.dispatch(&[key], 4, &params(10)).started, 1);
        assert_eq!(output.started_count(), 2);
    }

    #[test]
    fn test_sound_disabled_creates_nothing() {
        let output = Arc::new(RecordingOutput::new());
        let mut engine = engine_with(1.0, Arc::clone(&output));
        let muted = ProcessingParams {
            sound_enabled: false,
            ..params(1000)
        };

        let cells = all_cells(40, 25);
        assert_eq!(cells.len(), 1000);
        let report = engine.dispatch(&cells, 25, &muted);

        assert_eq!(report, TriggerReport::default());
        assert_eq!(output.started_count(), 0);
        assert_eq!(engine.live_voice_count(), 0);
    }

    #[test]
    fn test_unavailable_output_is_a_no_op() {
        let mut engine = TriggerEngine::new(
            TriggerConfig {
                trigger_probability: 1.0,
                ..Default::default()
            },
            Arc::new(NullOutput),
        );
        let report = engine.dispatch(&all_cells(4, 4), 4, &params(4));
        assert_eq!(report, TriggerReport::default());
        assert_eq!(engine.live_voice_count(), 0);
    }

    #[test]
    fn test_rejected_start_releases_key() {
        let output = Arc::new(RecordingOutput::new());
        output.set_fail_starts(true);
        let mut engine = engine_with(1.0, Arc::clone(&output));

        let report = engine.dispatch(&[CellKey::new(0, 0)], 4, &params(4));
        assert_eq!(report.failed, 1);
        assert_eq!(engine.live_voice_count(), 0);

        output.set_fail_starts(false);
        assert_eq!(engine.dispatch(&[CellKey::new(0, 0)], 4, &params(4)).started, 1);
    }

    #[test]
    fn test_trigger_probability() {
        let output = Arc::new(RecordingOutput::new());
        let cells = all_cells(50, 20);

        let mut never = engine_with(0.0, Arc::clone(&output));
        let report = never.dispatch(&cells, 20, &params(2000));
        assert_eq!(report.suppressed, 1000);
        assert_eq!(output.started_count(), 0);

        let mut mostly = engine_with(0.8, Arc::clone(&output));
        let report = mostly.dispatch(&cells, 20, &params(2000));
        assert_eq!(report.started + report.suppressed, 1000);
        assert!((700..=900).contains(&report.started), "started {}", report.started);
    }

    #[test]
    fn test_tone_follows_row_and_volume() {
        let output = Arc::new(RecordingOutput::new());
        let mut engine = engine_with(1.0, Arc::clone(&output));
        let loud = ProcessingParams {
            volume: 1.0,
            ..params(10)
        };
        engine.dispatch(&[CellKey::new(0, 5), CellKey::new(3, 5)], 4, &loud);

        let tones = output.started();
        let config = engine.config();
        assert!((tones[0].frequency_hz - config.max_freq_hz).abs() < 0.01);
        assert!(tones[1].frequency_hz < tones[0].frequency_hz);
        for tone in &tones {
            assert!((tone.peak_gain - config.voice_gain).abs() < 1e-6);
            assert!(tone.detune_cents.abs() <= config.detune_cents);
            assert!((0.1..0.35).contains(&tone.partial_level));
        }
    }

    #[test]
    fn test_seeded_engines_agree() {
        let a_out = Arc::new(RecordingOutput::new());
        let b_out = Arc::new(RecordingOutput::new());
        let mut a = engine_with(0.75, Arc::clone(&a_out));
        let mut b = engine_with(0.75, Arc::clone(&b_out));
        let cells = all_cells(10, 10);

        assert_eq!(
            a.dispatch(&cells, 10, &params(30)),
            b.dispatch(&cells, 10, &params(30))
        );
        assert_eq!(a_out.started(), b_out.started());
    }
}
