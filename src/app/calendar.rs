use std::time::Duration;

use crate::app::{Next, Producer, ProducerContext, glyph_style};
use crate::foundation::core::{Anchor, Canvas, Padding, Rgba8};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::frame::buffer::FrameBuffer;
use crate::frame::ops::{hstack, vstack};
use crate::layer::NotificationUpdate;
use crate::text::TextRenderer;

pub const ACCENT_WIDTH: u32 = 3;
pub const CARD_BODY_WIDTH: u32 = 63;
const LABEL_HEIGHT: u32 = 6;
const TITLE_HEIGHT: u32 = 8;

/// A notification card: optional small label over a title, with an accent bar on the left and
/// one blank row underneath. Always `ACCENT_WIDTH + CARD_BODY_WIDTH` wide.
pub fn notification_card(
    text: &dyn TextRenderer,
    label: Option<&str>,
    title: &str,
) -> DotboardResult<FrameBuffer> {
    let style = glyph_style();
    let mut rows = Vec::with_capacity(2);
    if let Some(label) = label {
        rows.push(text.render_string(
            label,
            &style.clone().with_size(6.0),
            Canvas::new(CARD_BODY_WIDTH, LABEL_HEIGHT),
            Anchor::TopLeft,
            Padding::ZERO,
        )?);
    }
    rows.push(text.render_string(
        title,
        &style,
        Canvas::new(CARD_BODY_WIDTH, TITLE_HEIGHT),
        Anchor::TopLeft,
        Padding::ZERO,
    )?);
    let body = vstack(&rows)?;
    let outline = style.outline.unwrap_or(Rgba8::TRANSPARENT);
    let bar = accent_bar(body.height(), style.color, outline);
    let card = hstack(&[bar, body])?;
    let spacer = FrameBuffer::transparent(card.width(), 1);
    vstack(&[card, spacer])
}

/// Outlined vertical bar; the bottom row is left clear.
fn accent_bar(height: u32, fill: Rgba8, outline: Rgba8) -> FrameBuffer {
    FrameBuffer::from_fn(ACCENT_WIDTH, height, |x, y| {
        if y + 1 == height {
            Rgba8::TRANSPARENT.to_array()
        } else if x == 1 && y >= 1 && y + 2 < height {
            fill.to_array()
        } else {
            outline.to_array()
        }
    })
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct CalendarEvent {
    pub key: String,
    pub title: String,
    /// Minutes until the event starts.
    pub minutes: u32,
    #[serde(default = "default_event_duration")]
    pub duration_secs: u64,
}

fn default_event_duration() -> u64 {
    15
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct CalendarOptions {
    pub events: Vec<CalendarEvent>,
    pub interval_secs: u64,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            interval_secs: 60,
        }
    }
}

/// Upcoming-event notifications, one card per event, re-sent every interval.
pub struct CalendarApp {
    events: Vec<CalendarEvent>,
    interval: Duration,
}

impl CalendarApp {
    pub fn new(opts: CalendarOptions) -> DotboardResult<Self> {
        for (i, e) in opts.events.iter().enumerate() {
            if e.key.is_empty() {
                return Err(DotboardError::validation(format!(
                    "calendar event {i} has no key"
                )));
            }
        }
        Ok(Self {
            events: opts.events,
            interval: Duration::from_secs(opts.interval_secs),
        })
    }
}

impl Producer<NotificationUpdate> for CalendarApp {
    fn step(&mut self, ctx: &ProducerContext<NotificationUpdate>) -> DotboardResult<Next> {
        for event in &self.events {
            let label = format!("{} min", event.minutes);
            let card = notification_card(ctx.text(), Some(&label), &event.title)?;
            let duration = Duration::from_secs(event.duration_secs);
            ctx.publish(NotificationUpdate::new(event.key.clone(), card, duration))?;
        }
        if self.interval.is_zero() {
            return Ok(Next::Done);
        }
        Ok(Next::After(self.interval))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/calendar.rs"]
mod tests;
