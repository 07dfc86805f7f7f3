use std::time::Duration;

use ::time::format_description::OwnedFormatItem;
use ::time::{OffsetDateTime, UtcOffset};

use crate::app::{Next, Producer, ProducerContext, glyph_style};
use crate::foundation::core::{Anchor, Canvas, Padding};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::layer::WidgetUpdate;

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct TimeOptions {
    /// `time` crate format description.
    pub format: String,
    /// Fixed offset from UTC; the system offset when unset.
    pub utc_offset_hours: Option<i8>,
    pub interval_ms: u64,
    pub priority: i32,
}

impl Default for TimeOptions {
    fn default() -> Self {
        Self {
            format: "[hour repr:12 padding:none]:[minute]".to_owned(),
            utc_offset_hours: None,
            interval_ms: 500,
            priority: 0,
        }
    }
}

/// Widget "time": the current local time, top right.
pub struct TimeApp {
    format: OwnedFormatItem,
    offset: UtcOffset,
    interval: Duration,
    priority: i32,
}

impl TimeApp {
    pub const CONTAINER: Canvas = Canvas {
        width: 30,
        height: 8,
    };

    pub fn new(opts: TimeOptions) -> DotboardResult<Self> {
        let format = ::time::format_description::parse_owned::<2>(&opts.format).map_err(|e| {
            DotboardError::validation(format!("invalid time format '{}': {e}", opts.format))
        })?;
        let offset = match opts.utc_offset_hours {
            Some(h) => UtcOffset::from_hms(h, 0, 0)
                .map_err(|e| DotboardError::validation(format!("invalid utc offset: {e}")))?,
            None => UtcOffset::current_local_offset().unwrap_or_else(|_| {
                tracing::warn!("local utc offset unavailable, showing UTC");
                UtcOffset::UTC
            }),
        };
        Ok(Self {
            format,
            offset,
            interval: Duration::from_millis(opts.interval_ms.max(1)),
            priority: opts.priority,
        })
    }

    pub fn label(&self, at: OffsetDateTime) -> DotboardResult<String> {
        at.to_offset(self.offset)
            .format(&self.format)
            .map_err(|e| DotboardError::validation(format!("time format failed: {e}")))
    }
}

impl Producer<WidgetUpdate> for TimeApp {
    fn step(&mut self, ctx: &ProducerContext<WidgetUpdate>) -> DotboardResult<Next> {
        let label = self.label(OffsetDateTime::now_utc())?;
        let render = ctx.text().render_string(
            &label,
            &glyph_style(),
            Self::CONTAINER,
            Anchor::TopRight,
            Padding::new(0, 0, 1, 0),
        )?;
        ctx.publish(WidgetUpdate::new("time", render, self.priority))?;
        Ok(Next::After(self.interval))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/time.rs"]
mod tests;
