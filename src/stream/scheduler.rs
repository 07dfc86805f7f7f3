use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::app::stop::StopToken;
use crate::foundation::clock::Clock;
use crate::foundation::core::Fps;
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::frame::buffer::FrameBuffer;
use crate::stream::pacer::FramePacer;

/// Longest single park while ahead of schedule, so a stop request is noticed promptly.
const MAX_PARK: Duration = Duration::from_millis(50);
/// How long one receive waits before re-checking the stop token.
const PULL_POLL: Duration = Duration::from_millis(100);

/// A decoded frame tagged with the connection it came from.
///
/// The decoder bumps `generation` every time it re-establishes the source, which is how the
/// scheduler learns that the schedule must restart.
#[derive(Clone, Debug)]
pub struct StreamFrame {
    pub generation: u64,
    pub frame: FrameBuffer,
}

/// Drop every frame still buffered in `frames`. Returns how many were dropped.
///
/// The decoder calls this before re-establishing the source, so nothing from the broken
/// connection is shown after the reconnect.
pub fn discard_buffered(frames: &Receiver<StreamFrame>) -> usize {
    frames.try_iter().count()
}

/// Presents frames from a jittery source at exactly the source's nominal rate.
pub struct StreamScheduler {
    frames: Receiver<StreamFrame>,
    clock: Arc<dyn Clock>,
    pacer: FramePacer,
    generation: u64,
    pending: Option<StreamFrame>,
    discarded: u64,
    resets: u64,
}

impl StreamScheduler {
    pub fn new(frames: Receiver<StreamFrame>, fps: Fps, clock: Arc<dyn Clock>) -> Self {
        let pacer = FramePacer::new(fps, clock.now());
        Self {
            frames,
            clock,
            pacer,
            generation: 0,
            pending: None,
            discarded: 0,
            resets: 0,
        }
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    /// Frames dropped to catch up, over the scheduler's lifetime.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Times the schedule restarted because the source reconnected.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Block until the next frame is due and return it.
    ///
    /// Frames the consumer is too late for are discarded first. A frame from a newer
    /// connection restarts the schedule at the moment it arrives, so nothing after a
    /// reconnect is judged against the old start time.
    pub fn next_frame(&mut self, stop: &StopToken) -> DotboardResult<FrameBuffer> {
        loop {
            while self.pending.is_none()
                && self.pacer.displayed() < self.pacer.expected(self.clock.now())
            {
                let f = self.pull(stop)?;
                if self.resync(&f) {
                    self.pending = Some(f);
                    break;
                }
                self.pacer.advance();
                self.discarded += 1;
            }

            self.wait_until_due(stop)?;

            let f = match self.pending.take() {
                Some(f) => f,
                None => self.pull(stop)?,
            };
            if self.resync(&f) {
                self.pending = Some(f);
                continue;
            }
            self.pacer.advance();
            return Ok(f.frame);
        }
    }

    fn wait_until_due(&self, stop: &StopToken) -> DotboardResult<()> {
        loop {
            let now = self.clock.now();
            if !self.pacer.is_early(now) {
                return Ok(());
            }
            stop.check()?;
            self.clock.sleep(self.pacer.until_due(now).min(MAX_PARK));
        }
    }

    /// Next buffered frame, skipping any left over from an older connection.
    fn pull(&mut self, stop: &StopToken) -> DotboardResult<StreamFrame> {
        loop {
            stop.check()?;
            match self.frames.recv_timeout(PULL_POLL) {
                Ok(f) if f.generation < self.generation => self.discarded += 1,
                Ok(f) => return Ok(f),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(DotboardError::source("stream decoder went away"));
                }
            }
        }
    }

    /// Restart the schedule if `f` comes from a newer connection.
    fn resync(&mut self, f: &StreamFrame) -> bool {
        if f.generation == self.generation {
            return false;
        }
        let now = self.clock.now();
        tracing::info!(
            from = self.generation,
            to = f.generation,
            shown = self.pacer.displayed(),
            "stream reconnected, restarting frame schedule"
        );
        self.generation = f.generation;
        self.pacer.reset(now);
        self.resets += 1;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stream/scheduler.rs"]
mod tests;
