//! Per-category accumulators between producer mailboxes and the compositor.
//!
//! A layer drains its mailbox without blocking, keeps the latest relevant state, applies
//! time-based animation and renders a canvas-sized [`FrameBuffer`] on demand. Layers never wait
//! on their producer: with nothing new they re-render cached state.

pub mod background;
pub mod notification;
pub mod widget;

use std::time::Instant;

use crate::foundation::core::{Anchor, Canvas, Padding};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::frame::buffer::FrameBuffer;
use crate::frame::ops::{contain, vstack};
use crate::mailbox::MailboxReceiver;

pub use background::BackgroundLayer;
pub use notification::{NotificationLayer, NotificationUpdate};
pub use widget::{WidgetLayer, WidgetUpdate};

/// The visual categories, in default depth order (bottom first).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Background,
    Notification,
    Widget,
}

impl LayerKind {
    pub const DEFAULT_ORDER: [LayerKind; 3] = [
        LayerKind::Background,
        LayerKind::Notification,
        LayerKind::Widget,
    ];
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Background => "background",
            Self::Notification => "notification",
            Self::Widget => "widget",
        })
    }
}

pub trait Layer: Send {
    fn kind(&self) -> LayerKind;

    /// Drain pending updates and render the layer as of `now`.
    fn frame(&mut self, now: Instant) -> FrameBuffer;

    /// Forget all state and drop pending updates.
    fn clear(&mut self);
}

/// Geometry shared by the stacking layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackLayout {
    /// Every render must be exactly this wide.
    pub width: u32,
    /// Renders taller than this are rejected.
    pub max_height: u32,
    pub anchor: Anchor,
    pub padding: Padding,
}

impl StackLayout {
    pub(crate) fn validate(&self, render: &FrameBuffer) -> DotboardResult<()> {
        if render.width() != self.width {
            return Err(DotboardError::validation(format!(
                "render is {}px wide, expected {}",
                render.width(),
                self.width
            )));
        }
        if render.height() > self.max_height {
            return Err(DotboardError::validation(format!(
                "render is {}px tall, max is {}",
                render.height(),
                self.max_height
            )));
        }
        Ok(())
    }

    /// Stack `parts` top to bottom until the next one would overflow `canvas`, then place the
    /// stack on the canvas. The overflowing part and everything after it are dropped.
    pub(crate) fn compose(
        &self,
        canvas: Canvas,
        parts: impl IntoIterator<Item = FrameBuffer>,
    ) -> FrameBuffer {
        let mut kept = Vec::new();
        let mut total = 0u32;
        for part in parts {
            total += part.height();
            if total > canvas.height {
                break;
            }
            if part.height() > 0 {
                kept.push(part);
            }
        }
        match vstack(&kept) {
            Ok(stack) => contain(&stack, canvas, self.anchor, self.padding),
            Err(_) => FrameBuffer::transparent(canvas.width, canvas.height),
        }
    }
}

/// The reading ends feeding one layer, one mailbox per producer.
///
/// FIFO holds within each mailbox; nothing is promised across mailboxes.
pub(crate) struct Inbox<T> {
    sources: Vec<MailboxReceiver<T>>,
}

impl<T> Inbox<T> {
    pub(crate) fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub(crate) fn connect(&mut self, rx: MailboxReceiver<T>) {
        self.sources.push(rx);
    }

    /// Drop every reading end; their writers observe a closed mailbox.
    pub(crate) fn disconnect_all(&mut self) {
        self.sources.clear();
    }

    pub(crate) fn sources(&self) -> usize {
        self.sources.len()
    }

    pub(crate) fn drain(&self) -> Vec<T> {
        self.sources.iter().flat_map(|rx| rx.drain()).collect()
    }

    pub(crate) fn discard(&self) {
        for rx in &self.sources {
            rx.drain().for_each(drop);
        }
    }
}
