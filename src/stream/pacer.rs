use std::time::{Duration, Instant};

use crate::foundation::core::Fps;

/// Wall-clock bookkeeping for presenting a stream at its nominal rate.
///
/// Frame `n` (zero-based) becomes due once `floor((now - start) * fps) > n`. A consumer that
/// is behind discards until it is on schedule; one that is ahead waits until the next frame is
/// due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramePacer {
    fps: Fps,
    start: Instant,
    displayed: u64,
}

impl FramePacer {
    pub fn new(fps: Fps, start: Instant) -> Self {
        Self {
            fps,
            start,
            displayed: 0,
        }
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    /// Frames consumed so far, shown or discarded.
    pub fn displayed(&self) -> u64 {
        self.displayed
    }

    /// Restart the schedule at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.start = now;
        self.displayed = 0;
    }

    /// `floor((now - start) * fps)`.
    pub fn expected(&self, now: Instant) -> u64 {
        self.fps.frames_in(now.saturating_duration_since(self.start))
    }

    /// Frames that must be dropped to get back on schedule.
    pub fn behind(&self, now: Instant) -> u64 {
        self.expected(now).saturating_sub(self.displayed)
    }

    /// The next frame is not due yet.
    pub fn is_early(&self, now: Instant) -> bool {
        self.displayed >= self.expected(now)
    }

    /// Time left until the next frame is due. Zero once it is.
    pub fn until_due(&self, now: Instant) -> Duration {
        let due = self.start + self.fps.frame_start(self.displayed + 1);
        due.saturating_duration_since(now)
    }

    /// Record one frame consumed.
    pub fn advance(&mut self) {
        self.displayed += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stream/pacer.rs"]
mod tests;
