use std::sync::Arc;
use std::time::Instant;

use crate::compose::blend::alpha_blend;
use crate::compose::palette::ColorSampler;
use crate::foundation::clock::Clock;
use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::frame::buffer::FrameBuffer;
use crate::layer::{
    BackgroundLayer, Layer, LayerKind, NotificationLayer, NotificationUpdate, WidgetLayer,
    WidgetUpdate,
};
use crate::mailbox::{MailboxSender, Overflow, mailbox};

/// Pending frames a background mailbox holds before evicting the oldest.
pub const BACKGROUND_MAILBOX_CAPACITY: usize = 2;
/// Pending updates a notification or widget mailbox holds before the producer waits.
pub const UPDATE_MAILBOX_CAPACITY: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct CompositorSettings {
    pub canvas: Canvas,
    /// Colour under every layer.
    pub fill: Rgb8,
    /// Recolour marker pixels in upper layers with colours sampled from the background.
    pub color_remap: bool,
    /// Depth order, bottom first.
    pub order: Vec<LayerKind>,
}

impl CompositorSettings {
    /// Reject settings [`Compositor::new`] would refuse.
    pub fn validate(&self) -> DotboardResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(DotboardError::validation("canvas must be non-zero"));
        }
        validate_order(&self.order)
    }
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            canvas: Canvas::MATRIX,
            fill: Rgb8::BLACK,
            color_remap: false,
            order: LayerKind::DEFAULT_ORDER.to_vec(),
        }
    }
}

/// Owns the layers and blends them into the displayed frame.
///
/// The compositor never waits on a producer. Each call to [`Compositor::frame_at`] drains
/// whatever the mailboxes hold and re-renders cached state otherwise.
pub struct Compositor {
    settings: CompositorSettings,
    clock: Arc<dyn Clock>,
    background: BackgroundLayer,
    notifications: NotificationLayer,
    widgets: WidgetLayer,
    sampler: ColorSampler,
}

impl Compositor {
    pub fn new(settings: CompositorSettings, clock: Arc<dyn Clock>) -> DotboardResult<Self> {
        settings.validate()?;
        let canvas = settings.canvas;
        Ok(Self {
            clock,
            background: BackgroundLayer::new(canvas),
            notifications: NotificationLayer::new(canvas),
            widgets: WidgetLayer::new(canvas),
            sampler: ColorSampler::new(),
            settings,
        })
    }

    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }

    pub fn canvas(&self) -> Canvas {
        self.settings.canvas
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Change fill, remap and depth order. Layer state is kept.
    pub fn reconfigure(
        &mut self,
        fill: Rgb8,
        color_remap: bool,
        order: Vec<LayerKind>,
    ) -> DotboardResult<()> {
        validate_order(&order)?;
        self.settings.fill = fill;
        self.settings.color_remap = color_remap;
        self.settings.order = order;
        if !color_remap {
            self.sampler.reset();
        }
        Ok(())
    }

    pub fn background(&self) -> &BackgroundLayer {
        &self.background
    }

    pub fn background_mut(&mut self) -> &mut BackgroundLayer {
        &mut self.background
    }

    pub fn notifications(&self) -> &NotificationLayer {
        &self.notifications
    }

    pub fn widgets(&self) -> &WidgetLayer {
        &self.widgets
    }

    /// Open a latest-wins mailbox into the background layer.
    pub fn background_mailbox(&mut self) -> MailboxSender<FrameBuffer> {
        let (tx, rx) = mailbox(BACKGROUND_MAILBOX_CAPACITY, Overflow::DropOldest);
        self.background.connect(rx);
        tx
    }

    /// Open a lossless mailbox into the notification layer.
    pub fn notification_mailbox(&mut self) -> MailboxSender<NotificationUpdate> {
        let (tx, rx) = mailbox(UPDATE_MAILBOX_CAPACITY, Overflow::Block);
        self.notifications.connect(rx);
        tx
    }

    /// Open a lossless mailbox into the widget layer.
    pub fn widget_mailbox(&mut self) -> MailboxSender<WidgetUpdate> {
        let (tx, rx) = mailbox(UPDATE_MAILBOX_CAPACITY, Overflow::Block);
        self.widgets.connect(rx);
        tx
    }

    /// Clear every layer and close every mailbox. Writers still holding a sender see
    /// [`DotboardError::Stopped`] on their next push.
    pub fn disconnect_all(&mut self) {
        self.background.disconnect_all();
        self.notifications.disconnect_all();
        self.widgets.disconnect_all();
        self.sampler.reset();
    }

    /// Composite the layers as of the injected clock's "now".
    pub fn get_frame(&mut self) -> DotboardResult<FrameBuffer> {
        let now = self.clock.now();
        self.frame_at(now)
    }

    pub fn frame_at(&mut self, now: Instant) -> DotboardResult<FrameBuffer> {
        let mut frames = Vec::with_capacity(self.settings.order.len());
        for kind in &self.settings.order {
            let layer: &mut dyn Layer = match kind {
                LayerKind::Background => &mut self.background,
                LayerKind::Notification => &mut self.notifications,
                LayerKind::Widget => &mut self.widgets,
            };
            frames.push(layer.frame(now));
        }

        let remap = if self.settings.color_remap && self.background.is_active() {
            Some(self.sampler.update(self.background.current(), now))
        } else {
            None
        };
        alpha_blend(&frames, self.settings.canvas, self.settings.fill, remap)
    }
}

fn validate_order(order: &[LayerKind]) -> DotboardResult<()> {
    for (i, kind) in order.iter().enumerate() {
        if order[..i].contains(kind) {
            return Err(DotboardError::validation(format!(
                "layer '{kind}' appears twice in the depth order"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
