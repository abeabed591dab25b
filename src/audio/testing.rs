//! Recording audio output for deterministic tests.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{AudioOutput, CompletionFn, ToneSpec};
use crate::error::AudioError;

/// Records every started tone and lets tests decide when tones complete
pub(crate) struct RecordingOutput {
    available: AtomicBool,
    fail_starts: AtomicBool,
    started: Mutex<Vec<ToneSpec>>,
    pending: Mutex<Vec<CompletionFn>>,
}

impl RecordingOutput {
    pub(crate) fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            fail_starts: AtomicBool::new(false),
            started: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Report available but reject every start
    pub(crate) fn set_fail_starts(&self, fail: bool) {
        self.fail_starts.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn started(&self) -> Vec<ToneSpec> {
        self.started.lock().clone()
    }

    pub(crate) fn started_count(&self) -> usize {
        self.started.lock().len()
    }

    /// Finish every tone started so far
    pub(crate) fn complete_all(&self) {
        let pending: Vec<CompletionFn> = std::mem::take(&mut *self.pending.lock());
        for on_complete in pending {
            on_complete();
        }
    }
}

impl AudioOutput for RecordingOutput {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn start_tone(&self, tone: ToneSpec, on_complete: CompletionFn) -> Result<(), AudioError> {
        if !self.is_available() || self.fail_starts.load(Ordering::SeqCst) {
            return Err(AudioError::Unavailable);
        }
        self.started.lock().push(tone);
        self.pending.lock().push(on_complete);
        Ok(())
    }
}
