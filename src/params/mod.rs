//! Parameter definitions with physical units and documented semantics.
//!
//! All tunable numbers live here with:
//! - Physical units (Hz, seconds, milliseconds, percent)
//! - Documented ranges and meanings
//! - Coercion into the valid domain where values are user-supplied

mod audio;
mod grid;
mod processing;
mod render;
mod voice;

// Re-export all types
pub use audio::{audio_constants, AudioConfig, DelayConfig};
pub use grid::GridConfig;
pub use processing::{ControlSurface, ProcessingParams};
pub use render::RecordingConfig;
pub use voice::{EnvelopeConfig, TriggerConfig};
