use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::animation::transition::SlideFade;
use crate::foundation::core::{Anchor, Canvas, Padding};
use crate::frame::buffer::FrameBuffer;
use crate::frame::ops::{crop_rows, scale_alpha};
use crate::layer::{Inbox, Layer, LayerKind, StackLayout};
use crate::mailbox::MailboxReceiver;

/// Producer message: show `render` under `key` for `duration`.
#[derive(Clone, Debug)]
pub struct NotificationUpdate {
    pub key: String,
    pub render: FrameBuffer,
    pub duration: Duration,
}

impl NotificationUpdate {
    pub fn new(key: impl Into<String>, render: FrameBuffer, duration: Duration) -> Self {
        Self {
            key: key.into(),
            render,
            duration,
        }
    }
}

/// A live notification as tracked by the layer.
#[derive(Clone, Debug)]
pub struct Notification {
    pub render: FrameBuffer,
    pub duration: Duration,
    pub created: Instant,
    pub expires: Instant,
}

/// Keyed, expiring notification cards stacked newest-first from the top left.
pub struct NotificationLayer {
    canvas: Canvas,
    layout: StackLayout,
    transition: SlideFade,
    inbox: Inbox<NotificationUpdate>,
    entries: BTreeMap<String, Notification>,
}

impl NotificationLayer {
    pub const DEFAULT_LAYOUT: StackLayout = StackLayout {
        width: 66,
        max_height: 15,
        anchor: Anchor::TopLeft,
        padding: Padding::new(1, 0, 0, 1),
    };

    pub fn new(canvas: Canvas) -> Self {
        Self::with_layout(canvas, Self::DEFAULT_LAYOUT)
    }

    pub fn with_layout(canvas: Canvas, layout: StackLayout) -> Self {
        Self {
            canvas,
            layout,
            transition: SlideFade::default(),
            inbox: Inbox::new(),
            entries: BTreeMap::new(),
        }
    }

    pub fn layout(&self) -> StackLayout {
        self.layout
    }

    pub fn connect(&mut self, rx: MailboxReceiver<NotificationUpdate>) {
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

    pub fn get(&self, key: &str) -> Option<&Notification> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Create or re-trigger the notification under `update.key`.
    ///
    /// Re-triggering restarts the enter animation and the lifetime.
    pub fn apply(&mut self, update: NotificationUpdate, now: Instant) {
        if let Err(e) = self.layout.validate(&update.render) {
            tracing::warn!(key = %update.key, error = %e, "rejecting notification");
            return;
        }
        let entry = Notification {
            render: update.render,
            duration: update.duration,
            created: now,
            expires: now + update.duration,
        };
        self.entries.insert(update.key, entry);
    }

    fn drain(&mut self, now: Instant) {
        let pending: Vec<NotificationUpdate> = self.inbox.drain();
        for update in pending {
            self.apply(update, now);
        }
    }

    fn evict_expired(&mut self, now: Instant) {
        self.entries.retain(|key, n| {
            let alive = now <= n.expires;
            if !alive {
                tracing::debug!(%key, "notification expired");
            }
            alive
        });
    }
}

impl Layer for NotificationLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Notification
    }

    fn frame(&mut self, now: Instant) -> FrameBuffer {
        self.drain(now);
        self.evict_expired(now);

        let mut live: Vec<(&String, &Notification)> = self.entries.iter().collect();
        live.sort_by(|a, b| b.1.created.cmp(&a.1.created).then_with(|| a.0.cmp(b.0)));

        let transition = self.transition;
        // Index 0 is the newest entry; it keeps its full height while entering.
        let parts = live.into_iter().enumerate().map(|(i, (_, n))| {
            let sample = transition.sample(now, n.created, n.expires);
            let render = scale_alpha(&n.render, sample.opacity);
            if i == 0 {
                render
            } else {
                let rows = (f64::from(render.height()) * sample.height).floor() as u32;
                crop_rows(&render, rows)
            }
        });
        self.layout.compose(self.canvas, parts)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.inbox.discard();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/notification.rs"]
mod tests;
