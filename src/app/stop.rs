use std::sync::Mutex;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::foundation::clock::Clock;
use crate::foundation::error::{DotboardError, DotboardResult};

/// Create a linked stop handle and token.
pub fn stop_pair() -> (StopHandle, StopToken) {
    let (tx, rx) = crossbeam_channel::bounded(0);
    (
        StopHandle {
            tx: Mutex::new(Some(tx)),
        },
        StopToken { rx },
    )
}

/// Owner side of a stop signal. Stopping drops the channel's only sender, which every token
/// observes as a disconnect.
#[derive(Debug)]
pub struct StopHandle {
    tx: Mutex<Option<Sender<()>>>,
}

impl StopHandle {
    /// Signal stop. Calling this more than once is a no-op.
    pub fn stop(&self) {
        let mut tx = self.tx.lock().unwrap_or_else(|p| p.into_inner());
        tx.take();
    }

    pub fn is_stopped(&self) -> bool {
        self.tx.lock().unwrap_or_else(|p| p.into_inner()).is_none()
    }
}

/// Cooperative cancellation observed by producer loops.
#[derive(Clone, Debug)]
pub struct StopToken {
    rx: Receiver<()>,
}

impl StopToken {
    pub fn is_stopped(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// `Err(Stopped)` once stop has been signalled.
    pub fn check(&self) -> DotboardResult<()> {
        if self.is_stopped() {
            Err(DotboardError::Stopped)
        } else {
            Ok(())
        }
    }

    /// Sleep for `d` or until stopped, whichever comes first. Returns `true` if stopped.
    pub fn wait(&self, d: Duration) -> bool {
        matches!(
            self.rx.recv_timeout(d),
            Err(RecvTimeoutError::Disconnected)
        )
    }

    /// Like [`StopToken::wait`], measured on `clock`.
    pub fn wait_on(&self, clock: &dyn Clock, d: Duration) -> bool {
        clock.sleep_or_cancel(d, &self.rx)
    }

    /// The underlying channel, for `select!` alongside other receivers.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/stop.rs"]
mod tests;
