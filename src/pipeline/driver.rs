//! Fixed-cadence tick loop on a dedicated thread.

use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender, TryRecvError};
use tracing::{info, warn};

use super::Pipeline;

/// Spawns the tick loop
pub struct TickDriver;

impl TickDriver {
    /// Start ticking `pipeline` at the cadence in its control surface.
    ///
    /// Parameters are snapshotted once per tick; a cadence change takes
    /// effect from the following tick.
    pub fn start(pipeline: Pipeline) -> DriverHandle {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let thread = thread::spawn(move || {
            let mut pipeline = pipeline;
            let controls = pipeline.controls();
            info!("Tick driver started");

            loop {
                match stop_rx.try_recv() {
                    Ok(()) | Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }

                let started = Instant::now();
                let params = controls.snapshot();
                if let Err(e) = pipeline.step_with(&params) {
                    warn!("Tick failed: {}", e);
                }

                let remaining = params.cadence.saturating_sub(started.elapsed());
                match stop_rx.recv_timeout(remaining) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }

            info!("Tick driver stopped after {} ticks", pipeline.ticks_completed());
            pipeline
        });

        DriverHandle {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        }
    }
}

/// Owns the running tick thread; dropping it stops the loop
pub struct DriverHandle {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<Pipeline>>,
}

impl DriverHandle {
    /// Stop after the tick in progress and hand the pipeline back
    pub fn stop(mut self) -> Option<Pipeline> {
        self.signal_stop();
        self.thread.take().and_then(|thread| thread.join().ok())
    }

    /// Block until the loop exits on its own (it only does when stopped)
    pub fn join(mut self) -> Option<Pipeline> {
        self.thread.take().and_then(|thread| thread.join().ok())
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .map(|thread| !thread.is_finished())
            .unwrap_or(false)
    }

    fn signal_stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        self.signal_stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
