use std::time::{Duration, Instant};

use crate::animation::ease::Ease;
use crate::animation::transition::fade_in;
use crate::foundation::clock::secs_since;
use crate::foundation::core::Canvas;
use crate::frame::buffer::FrameBuffer;
use crate::frame::ops::scale_alpha;
use crate::layer::{Inbox, Layer, LayerKind};
use crate::mailbox::MailboxReceiver;

/// Timing knobs for [`BackgroundLayer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundTiming {
    /// Fade-in after the first frame following a clear.
    pub enter: Duration,
    /// Without new frames for this long, the last frame is considered stale.
    pub stale_after: Duration,
    /// Time to fade a stale frame down to `stale_opacity`.
    pub stale_fade: Duration,
    pub stale_opacity: f64,
}

impl Default for BackgroundTiming {
    fn default() -> Self {
        Self {
            enter: Duration::from_millis(800),
            stale_after: Duration::from_secs(3),
            stale_fade: Duration::from_secs(1),
            stale_opacity: 0.35,
        }
    }
}

/// Full-canvas layer showing the latest frame from a background producer.
///
/// Frames replace each other; nothing is merged. When the producer goes quiet after having
/// delivered frames (a stalled or reconnecting stream) the last good frame stays up, dimmed.
/// Single-shot producers (a still image) can opt out with `stale_after = Duration::MAX`.
pub struct BackgroundLayer {
    canvas: Canvas,
    timing: BackgroundTiming,
    inbox: Inbox<FrameBuffer>,
    current: FrameBuffer,
    activated: Option<Instant>,
    last_update: Option<Instant>,
}

impl BackgroundLayer {
    pub fn new(canvas: Canvas) -> Self {
        Self::with_timing(canvas, BackgroundTiming::default())
    }

    pub fn with_timing(canvas: Canvas, timing: BackgroundTiming) -> Self {
        Self {
            canvas,
            timing,
            inbox: Inbox::new(),
            current: FrameBuffer::transparent(canvas.width, canvas.height),
            activated: None,
            last_update: None,
        }
    }

    /// Read updates from `rx` as well, alongside any mailboxes already connected.
    pub fn connect(&mut self, rx: MailboxReceiver<FrameBuffer>) {
        self.inbox.connect(rx);
    }

    /// Clear and drop every connected mailbox. Their writers observe a closed mailbox.
    pub fn disconnect_all(&mut self) {
        self.clear();
        self.inbox.disconnect_all();
    }

    pub fn sources(&self) -> usize {
        self.inbox.sources()
    }

    pub fn set_timing(&mut self, timing: BackgroundTiming) {
        self.timing = timing;
    }

    /// The latest accepted frame, before any fading.
    pub fn current(&self) -> &FrameBuffer {
        &self.current
    }

    pub fn is_active(&self) -> bool {
        self.activated.is_some()
    }

    fn accept(&mut self, frame: FrameBuffer, now: Instant) {
        if frame.canvas() != self.canvas {
            tracing::warn!(
                got_w = frame.width(),
                got_h = frame.height(),
                want_w = self.canvas.width,
                want_h = self.canvas.height,
                "background frame has wrong size, ignoring"
            );
            return;
        }
        self.current = frame;
        self.last_update = Some(now);
        if self.activated.is_none() {
            tracing::debug!("background activated, starting fade-in");
            self.activated = Some(now);
        }
    }

    fn staleness_opacity(&self, now: Instant) -> f64 {
        let Some(last) = self.last_update else {
            return 1.0;
        };
        let quiet = secs_since(now, last);
        let after = self.timing.stale_after.as_secs_f64();
        if quiet <= after {
            return 1.0;
        }
        let fade = self.timing.stale_fade.as_secs_f64();
        let t = if fade <= 0.0 {
            1.0
        } else {
            Ease::InOutCubic.apply((quiet - after) / fade)
        };
        1.0 - t * (1.0 - self.timing.stale_opacity.clamp(0.0, 1.0))
    }
}

impl Layer for BackgroundLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Background
    }

    fn frame(&mut self, now: Instant) -> FrameBuffer {
        let pending: Vec<FrameBuffer> = self.inbox.drain();
        for frame in pending {
            self.accept(frame, now);
        }

        let Some(activated) = self.activated else {
            return self.current.clone();
        };
        let opacity = fade_in(now, activated, self.timing.enter) * self.staleness_opacity(now);
        scale_alpha(&self.current, opacity)
    }

    fn clear(&mut self) {
        self.activated = None;
        self.last_update = None;
        self.current = FrameBuffer::transparent(self.canvas.width, self.canvas.height);
        self.inbox.discard();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/background.rs"]
mod tests;
