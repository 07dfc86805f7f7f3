use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};

/// Source of "now" for animation and pacing.
///
/// All time-based logic in the pipeline is pull-driven through this trait so it can be
/// driven by [`ManualClock`] in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Park the calling thread for `d`.
    fn sleep(&self, d: Duration);

    /// Park for `d` or until every sender of `cancel` is gone. Returns `true` if cancelled.
    fn sleep_or_cancel(&self, d: Duration, cancel: &Receiver<()>) -> bool {
        matches!(cancel.recv_timeout(d), Err(RecvTimeoutError::Disconnected))
    }
}

/// Wall clock backed by [`Instant::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Virtual clock. `sleep` advances time instead of blocking.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, d: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now += d;
    }

    pub fn set(&self, t: Instant) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now = t;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }

    fn sleep_or_cancel(&self, d: Duration, cancel: &Receiver<()>) -> bool {
        if matches!(cancel.try_recv(), Err(TryRecvError::Disconnected)) {
            return true;
        }
        self.advance(d);
        // Virtual sleeps return at once; let other threads run.
        std::thread::yield_now();
        false
    }
}

/// Seconds elapsed from `since` to `now`, zero if `now` is earlier.
pub fn secs_since(now: Instant, since: Instant) -> f64 {
    now.saturating_duration_since(since).as_secs_f64()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/clock.rs"]
mod tests;
