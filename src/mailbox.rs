//! Small bounded single-producer/single-consumer queues between producers and layers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, SendTimeoutError, Sender, TryRecvError, TrySendError};

use crate::foundation::error::{DotboardError, DotboardResult};

/// How long a lossless push waits before re-arming.
const BLOCK_BACKOFF: Duration = Duration::from_millis(50);

/// What `push` does when the mailbox is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overflow {
    /// Evict the oldest pending item. Continuous media, latest wins.
    DropOldest,
    /// Wait until the consumer makes room. Sparse updates that must not be lost.
    Block,
}

struct Shared {
    closed: AtomicBool,
    evicted: AtomicU64,
}

/// Create a mailbox holding at most `capacity` pending items.
pub fn mailbox<T>(capacity: usize, overflow: Overflow) -> (MailboxSender<T>, MailboxReceiver<T>) {
    let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
    let shared = Arc::new(Shared {
        closed: AtomicBool::new(false),
        evicted: AtomicU64::new(0),
    });
    let evict = match overflow {
        Overflow::DropOldest => Some(rx.clone()),
        Overflow::Block => None,
    };
    (
        MailboxSender {
            tx,
            evict,
            overflow,
            shared: shared.clone(),
        },
        MailboxReceiver { rx, shared },
    )
}

/// Writing end. Deliberately not `Clone`: each mailbox has exactly one writer.
pub struct MailboxSender<T> {
    tx: Sender<T>,
    evict: Option<Receiver<T>>,
    overflow: Overflow,
    shared: Arc<Shared>,
}

impl<T> MailboxSender<T> {
    pub fn overflow(&self) -> Overflow {
        self.overflow
    }

    /// Whether the reading end has been dropped.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Number of items evicted to admit newer ones.
    pub fn evicted(&self) -> u64 {
        self.shared.evicted.load(Ordering::Relaxed)
    }

    /// Deliver `item`, applying the overflow policy.
    ///
    /// Fails with [`DotboardError::Stopped`] once the reader is gone, which is how a producer
    /// learns that it has been replaced.
    pub fn push(&self, item: T) -> DotboardResult<()> {
        if self.is_closed() {
            return Err(DotboardError::Stopped);
        }
        match self.overflow {
            Overflow::DropOldest => self.push_drop_oldest(item),
            Overflow::Block => self.push_blocking(item),
        }
    }

    fn push_drop_oldest(&self, mut item: T) -> DotboardResult<()> {
        loop {
            match self.tx.try_send(item) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Disconnected(_)) => return Err(DotboardError::Stopped),
                Err(TrySendError::Full(back)) => {
                    item = back;
                    if let Some(evict) = &self.evict
                        && evict.try_recv().is_ok()
                    {
                        self.shared.evicted.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }
    }

    fn push_blocking(&self, mut item: T) -> DotboardResult<()> {
        loop {
            match self.tx.send_timeout(item, BLOCK_BACKOFF) {
                Ok(()) => return Ok(()),
                Err(SendTimeoutError::Disconnected(_)) => return Err(DotboardError::Stopped),
                Err(SendTimeoutError::Timeout(back)) => {
                    tracing::trace!("mailbox full, producer waiting");
                    item = back;
                    if self.is_closed() {
                        return Err(DotboardError::Stopped);
                    }
                }
            }
        }
    }
}

/// Reading end, owned by a layer. Never blocks.
pub struct MailboxReceiver<T> {
    rx: Receiver<T>,
    shared: Arc<Shared>,
}

impl<T> MailboxReceiver<T> {
    pub fn try_pop(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Pop everything currently pending, oldest first.
    pub fn drain(&self) -> impl Iterator<Item = T> + '_ {
        self.rx.try_iter()
    }
}

impl<T> Drop for MailboxReceiver<T> {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "../tests/unit/mailbox.rs"]
mod tests;
