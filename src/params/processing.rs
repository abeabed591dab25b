//! Live processing parameters and the control surface that mutates them.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

/// Neutral contrast (percent)
const NEUTRAL_CONTRAST: f32 = 100.0;

/// Parameters read fresh at the start of every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingParams {
    /// Binary threshold on adjusted luma, 0..=255 (strictly greater = on)
    pub threshold: f32,

    /// Signed luma offset, -255..=255
    pub brightness: f32,

    /// Contrast around mid-grey in percent (100 = neutral), 0..=400
    pub contrast: f32,

    /// Reflect column order before sampling (selfie view)
    pub mirror_enabled: bool,

    /// When false the trigger engine does no work at all
    pub sound_enabled: bool,

    /// Peak gain scale for new voices, 0..=1
    pub volume: f32,

    /// Upper bound on concurrently sounding voices (>= 1)
    pub max_voices: usize,

    /// Tick period
    pub cadence: Duration,
}

impl ProcessingParams {
    pub const MIN_CADENCE: Duration = Duration::from_millis(10);
    pub const MAX_CADENCE: Duration = Duration::from_secs(2);
    pub const MAX_CONTRAST: f32 = 400.0;

    /// Return a copy with every field coerced into its valid domain.
    ///
    /// Non-finite numbers fall back to the defaults; finite ones are clamped.
    pub fn coerced(self) -> Self {
        let defaults = Self::default();
        Self {
            threshold: clamp_or(self.threshold, 0.0, 255.0, defaults.threshold),
            brightness: clamp_or(self.brightness, -255.0, 255.0, defaults.brightness),
            contrast: clamp_or(self.contrast, 0.0, Self::MAX_CONTRAST, defaults.contrast),
            mirror_enabled: self.mirror_enabled,
            sound_enabled: self.sound_enabled,
            volume: clamp_or(self.volume, 0.0, 1.0, defaults.volume),
            max_voices: self.max_voices.max(1),
            cadence: self.cadence.clamp(Self::MIN_CADENCE, Self::MAX_CADENCE),
        }
    }
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self {
            threshold: 128.0,
            brightness: 0.0,
            contrast: NEUTRAL_CONTRAST,
            mirror_enabled: true, // Webcam feeds read naturally mirrored
            sound_enabled: true,
            volume: 0.5,
            max_voices: 12,
            cadence: Duration::from_millis(100),
        }
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Externally settable parameters shared between the UI side and the tick driver.
///
/// Cloning shares the same underlying parameters. Each setter coerces its
/// input and takes effect from the next [`ControlSurface::snapshot`].
#[derive(Debug, Clone, Default)]
pub struct ControlSurface {
    params: Arc<RwLock<ProcessingParams>>,
}

impl ControlSurface {
    pub fn new(params: ProcessingParams) -> Self {
        Self {
            params: Arc::new(RwLock::new(params.coerced())),
        }
    }

    /// Consistent copy of all parameters for one tick
    pub fn snapshot(&self) -> ProcessingParams {
        *self.params.read()
    }

    fn update(&self, f: impl FnOnce(&mut ProcessingParams)) {
        let mut params = self.params.write();
        let mut next = *params;
        f(&mut next);
        *params = next.coerced();
    }

    pub fn set_threshold(&self, threshold: f32) {
        self.update(|p| p.threshold = if threshold.is_finite() { threshold } else { p.threshold });
    }

    pub fn set_brightness(&self, brightness: f32) {
        self.update(|p| p.brightness = if brightness.is_finite() { brightness } else { p.brightness });
    }

    pub fn set_contrast(&self, contrast: f32) {
        self.update(|p| p.contrast = if contrast.is_finite() { contrast } else { p.contrast });
    }

    pub fn set_mirror(&self, enabled: bool) {
        self.update(|p| p.mirror_enabled = enabled);
    }

    pub fn set_sound_enabled(&self, enabled: bool) {
        self.update(|p| p.sound_enabled = enabled);
    }

    pub fn set_volume(&self, volume: f32) {
        self.update(|p| p.volume = if volume.is_finite() { volume } else { p.volume });
    }

    pub fn set_max_voices(&self, max_voices: usize) {
        self.update(|p| p.max_voices = max_voices);
    }

    pub fn set_cadence(&self, cadence: Duration) {
        self.update(|p| p.cadence = cadence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_clamp_into_domain() {
        let controls = ControlSurface::default();

        controls.set_threshold(300.0);
        controls.set_brightness(-1000.0);
        controls.set_contrast(-5.0);
        controls.set_volume(1.5);
        controls.set_max_voices(0);
        controls.set_cadence(Duration::from_millis(1));

        let p = controls.snapshot();
        assert_eq!(p.threshold, 255.0);
        assert_eq!(p.brightness, -255.0);
        assert_eq!(p.contrast, 0.0);
        assert_eq!(p.volume, 1.0);
        assert_eq!(p.max_voices, 1);
        assert_eq!(p.cadence, ProcessingParams::MIN_CADENCE);
    }

    #[test]
    fn test_non_finite_input_keeps_previous_value() {
        let controls = ControlSurface::default();
        controls.set_threshold(90.0);
        controls.set_threshold(f32::NAN);
        controls.set_volume(f32::INFINITY);

        let p = controls.snapshot();
        assert_eq!(p.threshold, 90.0);
        assert_eq!(p.volume, ProcessingParams::default().volume);
    }

    #[test]
    fn test_clones_share_parameters() {
        let controls = ControlSurface::default();
        let ui_side = controls.clone();

        ui_side.set_mirror(false);
        ui_side.set_sound_enabled(false);

        let p = controls.snapshot();
        assert!(!p.mirror_enabled);
        assert!(!p.sound_enabled);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_updates() {
        let controls = ControlSurface::default();
        let before = controls.snapshot();
        controls.set_threshold(10.0);
        assert_eq!(before.threshold, 128.0);
        assert_eq!(controls.snapshot().threshold, 10.0);
    }
}
