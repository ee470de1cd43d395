//! Pacing for full-program runs.
//!
//! The pause between commands is a run's only suspension point. Pacing
//! is injected so presentation layers keep their animation cadence while
//! tests drive runs synchronously.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default inter-step delay for real-time runs.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(650);

/// Controls the gap between commands during a full run.
pub trait StepPacer {
    /// Called after each command. Returns whether the run should
    /// continue; `false` cancels the remainder.
    fn pause(&mut self) -> bool;
}

/// Sleeps a fixed delay between commands and honors a shared cancel
/// flag, so a host can stop an in-flight run from another handle.
#[derive(Clone, Debug)]
pub struct FixedDelayPacer {
    delay: Duration,
    cancelled: Arc<AtomicBool>,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle that cancels the run this pacer is driving.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: Arc::clone(&self.cancelled),
        }
    }
}

impl Default for FixedDelayPacer {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_DELAY)
    }
}

impl StepPacer for FixedDelayPacer {
    fn pause(&mut self) -> bool {
        if self.cancelled.load(Ordering::Relaxed) {
            return false;
        }
        std::thread::sleep(self.delay);
        !self.cancelled.load(Ordering::Relaxed)
    }
}

/// Cancels the run driven by the pacer it was taken from.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Runs every command back to back; the pacer used by tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantPacer;

impl StepPacer for InstantPacer {
    fn pause(&mut self) -> bool {
        true
    }
}
