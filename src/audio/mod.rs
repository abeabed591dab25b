//! Sonification of grid transitions.
//!
//! Activated cells become short envelope-gated tones through a bounded voice
//! pool. Tones are mixed on a shared bus that the `cpal` stream (or the
//! offline recorder) pulls from on its own clock.

mod bus;
mod delay;
mod system;
mod tone;
mod trigger;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public types
pub use bus::MixBus;
pub use delay::FeedbackDelay;
pub use system::AudioSystem;
pub use tone::{CompletionFn, Envelope, ToneSpec, ToneVoice};
pub use trigger::{row_frequency, TriggerEngine, TriggerReport};

use crate::error::AudioError;

/// The audio output collaborator: a shared mix bus voices connect into
pub trait AudioOutput: Send + Sync {
    /// False when no device/bus can accept new tones
    fn is_available(&self) -> bool;

    /// Start a tone; `on_complete` runs once its envelope has finished.
    ///
    /// On error the callback is dropped without being called.
    fn start_tone(&self, tone: ToneSpec, on_complete: CompletionFn) -> Result<(), AudioError>;
}

/// Output used when no audio subsystem exists; every tone is rejected
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn is_available(&self) -> bool {
        false
    }

    fn start_tone(&self, _tone: ToneSpec, _on_complete: CompletionFn) -> Result<(), AudioError> {
        Err(AudioError::Unavailable)
    }
}
