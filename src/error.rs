//! Error taxonomy for the frame-to-grid-to-sound pipeline.

use thiserror::Error;

/// Errors raised by frame sources (the camera collaborator)
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Failed to decode frame: {0}")]
    Decode(String),

    #[error("No supported images in sequence directory: {0}")]
    EmptySequence(String),

    #[error("Source has no frame ready")]
    NotReady,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the audio output collaborator
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio output unavailable")]
    Unavailable,

    #[error("No audio output device found")]
    NoDevice,

    #[error("Failed to get audio config: {0}")]
    Config(String),

    #[error("Audio stream error: {0}")]
    Stream(String),
}

/// Errors raised while running a single pipeline tick
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Sample buffer is {got_cols}x{got_rows}, grid is {cols}x{rows}")]
    GridMismatch {
        cols: usize,
        rows: usize,
        got_cols: usize,
        got_rows: usize,
    },
}

/// Errors raised by renderer collaborators
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to save frame: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors raised by the offline recording mode
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to write audio: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Invalid static configuration (detected before anything starts)
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Grid must have at least one column and one row, got {cols}x{rows}")]
    EmptyGrid { cols: usize, rows: usize },

    #[error("Frequency range must satisfy 0 < min < max, got {min_hz}..{max_hz}")]
    FrequencyRange { min_hz: f32, max_hz: f32 },

    #[error("Trigger probability must be within 0..=1, got {0}")]
    TriggerProbability(f32),

    #[error("Detune must be finite, got {0} cents")]
    Detune(f32),

    #[error("Envelope attack + release ({0}s) exceeds duration ({1}s)")]
    Envelope(f32, f32),

    #[error("Sample rate must be > 0")]
    SampleRate,
}
