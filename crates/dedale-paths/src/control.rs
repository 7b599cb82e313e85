//! Cooperative pause / resume / cancel gate shared between a running search
//! and whoever observes it.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct GateState {
    paused: bool,
    cancelled: bool,
    step_delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct Gate {
    state: Mutex<GateState>,
    wake: Condvar,
}

/// A cloneable handle controlling a search from outside its loop.
///
/// The run only looks at the gate at its suspension point, once per
/// iteration: a `pause()` issued mid-iteration takes effect there, and
/// `resume()` or `cancel()` release a paused run exactly once.
#[derive(Clone, Debug, Default)]
pub struct SearchControl {
    gate: Arc<Gate>,
}

impl SearchControl {
    /// Create an open, non-cancelled gate with no step delay.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.gate.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Close the gate. Idempotent.
    pub fn pause(&self) {
        let mut s = self.lock();
        if !s.paused && !s.cancelled {
            s.paused = true;
            log::debug!("search paused");
        }
    }

    /// Reopen the gate. No-op if not paused.
    pub fn resume(&self) {
        let mut s = self.lock();
        if s.paused {
            s.paused = false;
            log::debug!("search resumed");
            self.gate.wake.notify_all();
        }
    }

    /// Request termination at the next check point, releasing a pause or a
    /// step delay in progress.
    pub fn cancel(&self) {
        let mut s = self.lock();
        s.cancelled = true;
        s.paused = false;
        log::debug!("search cancellation requested");
        self.gate.wake.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Artificial pause between progress events, if any.
    pub fn step_delay(&self) -> Option<Duration> {
        self.lock().step_delay
    }

    /// Change the step delay; a running search picks it up at its next
    /// iteration.
    pub fn set_step_delay(&self, delay: Option<Duration>) {
        self.lock().step_delay = delay;
    }

    /// Clear the pause and cancel flags for a new run. The step delay is kept.
    pub(crate) fn reset(&self) {
        let mut s = self.lock();
        s.paused = false;
        s.cancelled = false;
    }

    /// Block while the gate is closed. Returns `true` if the run should stop.
    pub(crate) fn wait_if_paused(&self) -> bool {
        let guard = self.lock();
        let guard = self
            .gate
            .wake
            .wait_while(guard, |s| s.paused && !s.cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        guard.cancelled
    }

    /// Sleep for `delay`, cut short by `cancel()`. Returns `true` if the run
    /// should stop.
    pub(crate) fn sleep(&self, delay: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .gate
            .wake
            .wait_timeout_while(guard, delay, |s| !s.cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        guard.cancelled
    }
}
