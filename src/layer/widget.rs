use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::animation::transition::fade_in;
use crate::foundation::core::{Anchor, Canvas, Padding};
use crate::frame::buffer::FrameBuffer;
use crate::frame::ops::scale_alpha;
use crate::layer::{Inbox, Layer, LayerKind, StackLayout};
use crate::mailbox::MailboxReceiver;

/// Producer message: replace the widget called `name`.
#[derive(Clone, Debug)]
pub struct WidgetUpdate {
    pub name: String,
    pub render: FrameBuffer,
    /// Lower values stack higher.
    pub priority: i32,
}

impl WidgetUpdate {
    pub fn new(name: impl Into<String>, render: FrameBuffer, priority: i32) -> Self {
        Self {
            name: name.into(),
            render,
            priority,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Widget {
    pub render: FrameBuffer,
    pub priority: i32,
    /// Set when the name is first seen, kept across updates.
    pub created: Instant,
}

/// Persistent keyed widgets stacked by priority from the top right.
pub struct WidgetLayer {
    canvas: Canvas,
    layout: StackLayout,
    enter: Duration,
    inbox: Inbox<WidgetUpdate>,
    widgets: BTreeMap<String, Widget>,
}

impl WidgetLayer {
    pub const DEFAULT_LAYOUT: StackLayout = StackLayout {
        width: 30,
        max_height: 15,
        anchor: Anchor::TopRight,
        padding: Padding::new(1, 1, 0, 0),
    };

    pub fn new(canvas: Canvas) -> Self {
        Self::with_layout(canvas, Self::DEFAULT_LAYOUT)
    }

    pub fn with_layout(canvas: Canvas, layout: StackLayout) -> Self {
        Self {
            canvas,
            layout,
            enter: Duration::from_millis(400),
            inbox: Inbox::new(),
            widgets: BTreeMap::new(),
        }
    }

    pub fn layout(&self) -> StackLayout {
        self.layout
    }

    pub fn connect(&mut self, rx: MailboxReceiver<WidgetUpdate>) {
        self.inbox.connect(rx);
    }

    pub fn disconnect_all(&mut self) {
        self.clear();
        self.inbox.disconnect_all();
    }

    pub fn sources(&self) -> usize {
        self.inbox.sources()
    }

    pub fn get(&self, name: &str) -> Option<&Widget> {
        self.widgets.get(name)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn apply(&mut self, update: WidgetUpdate, now: Instant) {
        if let Err(e) = self.layout.validate(&update.render) {
            tracing::warn!(name = %update.name, error = %e, "rejecting widget");
            return;
        }
        let created = self
            .widgets
            .get(&update.name)
            .map_or(now, |existing| existing.created);
        self.widgets.insert(
            update.name,
            Widget {
                render: update.render,
                priority: update.priority,
                created,
            },
        );
    }
}

impl Layer for WidgetLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Widget
    }

    fn frame(&mut self, now: Instant) -> FrameBuffer {
        let pending: Vec<WidgetUpdate> = self.inbox.drain();
        for update in pending {
            self.apply(update, now);
        }

        let mut ordered: Vec<(&String, &Widget)> = self.widgets.iter().collect();
        ordered.sort_by(|a, b| {
            a.1.priority
                .cmp(&b.1.priority)
                .then_with(|| a.1.created.cmp(&b.1.created))
                .then_with(|| a.0.cmp(b.0))
        });

        let enter = self.enter;
        let parts = ordered
            .into_iter()
            .map(|(_, w)| scale_alpha(&w.render, fade_in(now, w.created, enter)));
        self.layout.compose(self.canvas, parts)
    }

    fn clear(&mut self) {
        self.widgets.clear();
        self.inbox.discard();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/widget.rs"]
mod tests;
