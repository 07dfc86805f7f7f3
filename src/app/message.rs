use std::time::Duration;

use crate::app::calendar::notification_card;
use crate::app::{Next, Producer, ProducerContext};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::layer::NotificationUpdate;

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct MessageOptions {
    pub key: String,
    pub text: String,
    pub label: Option<String>,
    pub duration_secs: u64,
    /// Zero sends the message once.
    pub interval_secs: u64,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self {
            key: "message".to_owned(),
            text: String::new(),
            label: None,
            duration_secs: 10,
            interval_secs: 60,
        }
    }
}

/// A single configured notification, repeated on an interval.
pub struct MessageApp {
    opts: MessageOptions,
}

impl MessageApp {
    pub fn new(opts: MessageOptions) -> DotboardResult<Self> {
        if opts.text.is_empty() {
            return Err(DotboardError::validation("message needs text"));
        }
        Ok(Self { opts })
    }
}

impl Producer<NotificationUpdate> for MessageApp {
    fn step(&mut self, ctx: &ProducerContext<NotificationUpdate>) -> DotboardResult<Next> {
        let card = notification_card(ctx.text(), self.opts.label.as_deref(), &self.opts.text)?;
        let duration = Duration::from_secs(self.opts.duration_secs);
        ctx.publish(NotificationUpdate::new(self.opts.key.clone(), card, duration))?;
        if self.opts.interval_secs == 0 {
            return Ok(Next::Done);
        }
        Ok(Next::After(Duration::from_secs(self.opts.interval_secs)))
    }
}
