//! Producers: isolated workers that feed one layer each.
//!
//! Every producer runs on its own named thread with its own failure domain. It talks to the
//! compositor only through its mailbox, sleeps at its own cadence and never waits on the
//! display tick. Transient failures are retried after a backoff; setup failures halt the
//! producer and leave its layer blank.

pub mod calendar;
pub mod image;
pub mod message;
pub mod setup;
pub mod stop;
pub mod stream;
pub mod time;
pub mod weather;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;

use crate::compose::blend::{BACKGROUND_MARKER, FOREGROUND_MARKER};
use crate::compose::compositor::Compositor;
use crate::foundation::clock::Clock;
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::frame::buffer::FrameBuffer;
use crate::layer::{LayerKind, NotificationUpdate, WidgetUpdate};
use crate::mailbox::MailboxSender;
use crate::text::{TextRenderer, TextStyle};
use stop::{StopHandle, StopToken, stop_pair};

/// Default pause after a transient failure.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// The closed set of producer kinds a configuration may name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppKind {
    Time,
    Weather,
    YtStream,
    Video,
    Image,
    Setup,
    Calendar,
    Message,
}

impl AppKind {
    pub const ALL: [AppKind; 8] = [
        AppKind::Time,
        AppKind::Weather,
        AppKind::YtStream,
        AppKind::Video,
        AppKind::Image,
        AppKind::Setup,
        AppKind::Calendar,
        AppKind::Message,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Weather => "weather",
            Self::YtStream => "yt_stream",
            Self::Video => "video",
            Self::Image => "image",
            Self::Setup => "setup",
            Self::Calendar => "calendar",
            Self::Message => "message",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// The layer this kind of producer feeds.
    pub fn layer(self) -> LayerKind {
        match self {
            Self::Time | Self::Weather => LayerKind::Widget,
            Self::YtStream | Self::Video | Self::Image | Self::Setup => LayerKind::Background,
            Self::Calendar | Self::Message => LayerKind::Notification,
        }
    }
}

impl std::fmt::Display for AppKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a producer wants after one unit of work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Next {
    /// Run again after this pause.
    After(Duration),
    /// Nothing more to produce.
    Done,
}

/// Everything a producer may touch: its outlet, its stop signal and shared read-only services.
pub struct ProducerContext<U> {
    outlet: MailboxSender<U>,
    stop: StopToken,
    canvas: Canvas,
    text: Arc<dyn TextRenderer>,
    clock: Arc<dyn Clock>,
}

impl<U> ProducerContext<U> {
    pub fn new(
        outlet: MailboxSender<U>,
        stop: StopToken,
        canvas: Canvas,
        text: Arc<dyn TextRenderer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            outlet,
            stop,
            canvas,
            text,
            clock,
        }
    }

    /// Deliver one update. Fails with [`DotboardError::Stopped`] once the producer has been
    /// replaced.
    pub fn publish(&self, update: U) -> DotboardResult<()> {
        self.stop.check()?;
        self.outlet.push(update)
    }

    pub fn stop(&self) -> &StopToken {
        &self.stop
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn text(&self) -> &dyn TextRenderer {
        self.text.as_ref()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }
}

/// A self-paced source of updates for one layer.
pub trait Producer<U>: Send + 'static {
    /// Do one unit of work, usually producing at most one update.
    fn step(&mut self, ctx: &ProducerContext<U>) -> DotboardResult<Next>;

    /// Pause after a transient failure.
    fn retry_delay(&self) -> Duration {
        RETRY_DELAY
    }
}

/// A configured producer, typed by the layer it feeds.
pub enum AppInstance {
    Background(Box<dyn Producer<FrameBuffer>>),
    Notification(Box<dyn Producer<NotificationUpdate>>),
    Widget(Box<dyn Producer<WidgetUpdate>>),
}

impl AppInstance {
    pub fn layer(&self) -> LayerKind {
        match self {
            Self::Background(_) => LayerKind::Background,
            Self::Notification(_) => LayerKind::Notification,
            Self::Widget(_) => LayerKind::Widget,
        }
    }

    /// Open a fresh mailbox into the matching layer and start the producer thread.
    pub fn start(
        self,
        kind: AppKind,
        compositor: &mut Compositor,
        text: Arc<dyn TextRenderer>,
    ) -> DotboardResult<AppHandle> {
        let canvas = compositor.canvas();
        let clock = compositor.clock().clone();
        let (handle, token) = stop_pair();
        let thread = match self {
            Self::Background(p) => {
                let outlet = compositor.background_mailbox();
                spawn_producer(kind, p, ProducerContext::new(outlet, token, canvas, text, clock))?
            }
            Self::Notification(p) => {
                let outlet = compositor.notification_mailbox();
                spawn_producer(kind, p, ProducerContext::new(outlet, token, canvas, text, clock))?
            }
            Self::Widget(p) => {
                let outlet = compositor.widget_mailbox();
                spawn_producer(kind, p, ProducerContext::new(outlet, token, canvas, text, clock))?
            }
        };
        Ok(AppHandle {
            kind,
            stop: handle,
            thread: Some(thread),
        })
    }
}

/// A running producer. Dropping the handle stops the producer without waiting for it.
pub struct AppHandle {
    kind: AppKind,
    stop: StopHandle,
    thread: Option<JoinHandle<()>>,
}

impl AppHandle {
    pub fn kind(&self) -> AppKind {
        self.kind
    }

    /// Ask the producer to stop. Safe to call repeatedly.
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop and wait for the thread to exit.
    pub fn join(mut self) {
        self.stop();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::error!(app = %self.kind, "producer thread panicked outside its guard");
        }
    }
}

impl Drop for AppHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppHandle")
            .field("kind", &self.kind)
            .field("stopped", &self.stop.is_stopped())
            .finish()
    }
}

fn spawn_producer<U: Send + 'static>(
    kind: AppKind,
    mut producer: Box<dyn Producer<U>>,
    ctx: ProducerContext<U>,
) -> DotboardResult<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(format!("app-{kind}"))
        .spawn(move || {
            tracing::info!(app = %kind, "producer started");
            let outcome =
                catch_unwind(AssertUnwindSafe(|| run_producer(kind, producer.as_mut(), &ctx)));
            if let Err(panic) = outcome {
                let msg = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_owned())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_owned());
                tracing::error!(app = %kind, panic = %msg, "producer crashed");
            }
        })
        .map_err(|e| DotboardError::source(format!("failed to spawn producer thread: {e}")))
}

/// Drive `producer` until it finishes, halts or is stopped.
pub fn run_producer<U: 'static>(kind: AppKind, producer: &mut dyn Producer<U>, ctx: &ProducerContext<U>) {
    loop {
        let pause = match producer.step(ctx) {
            Ok(Next::After(d)) => d,
            Ok(Next::Done) => {
                tracing::debug!(app = %kind, "producer finished");
                return;
            }
            Err(DotboardError::Stopped) => {
                tracing::debug!(app = %kind, "producer stopped");
                return;
            }
            Err(e) if e.is_transient() => {
                let delay = producer.retry_delay();
                tracing::warn!(
                    app = %kind,
                    error = %e,
                    retry_in = ?delay,
                    "producer failed, retrying"
                );
                delay
            }
            Err(e) => {
                tracing::error!(app = %kind, error = %e, "producer halted");
                return;
            }
        };
        if ctx.stop.wait_on(ctx.clock.as_ref(), pause) {
            tracing::debug!(app = %kind, "producer stopped");
            return;
        }
    }
}

/// Build a producer of `kind` from its JSON options.
///
/// `null` options mean "all defaults". Unknown option fields are ignored.
pub fn create_app(kind: AppKind, options: serde_json::Value) -> DotboardResult<AppInstance> {
    let instance = match kind {
        AppKind::Time => {
            let app = time::TimeApp::new(decode_options(options)?)?;
            AppInstance::Widget(Box::new(app))
        }
        AppKind::Weather => {
            let app = weather::WeatherApp::new(decode_options(options)?)?;
            AppInstance::Widget(Box::new(app))
        }
        AppKind::YtStream => {
            let app = stream::StreamApp::youtube(decode_options(options)?)?;
            AppInstance::Background(Box::new(app))
        }
        AppKind::Video => {
            let app = stream::StreamApp::video(decode_options(options)?)?;
            AppInstance::Background(Box::new(app))
        }
        AppKind::Image => {
            let app = image::ImageApp::new(decode_options(options)?)?;
            AppInstance::Background(Box::new(app))
        }
        AppKind::Setup => {
            let app = setup::SetupApp::new(decode_options(options)?);
            AppInstance::Background(Box::new(app))
        }
        AppKind::Calendar => {
            let app = calendar::CalendarApp::new(decode_options(options)?)?;
            AppInstance::Notification(Box::new(app))
        }
        AppKind::Message => {
            let app = message::MessageApp::new(decode_options(options)?)?;
            AppInstance::Notification(Box::new(app))
        }
    };
    Ok(instance)
}

fn decode_options<T: DeserializeOwned + Default>(options: serde_json::Value) -> DotboardResult<T> {
    if options.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(options)
        .map_err(|e| DotboardError::validation(format!("invalid options: {e}")))
}

/// Text style for producer-drawn glyphs. Marker colours let the compositor retheme them.
pub(crate) fn glyph_style() -> TextStyle {
    let [r, g, b] = FOREGROUND_MARKER.to_array();
    let [or, og, ob] = BACKGROUND_MARKER.to_array();
    TextStyle::default()
        .with_color(Rgba8::new(r, g, b, 255))
        .with_outline(Rgba8::new(or, og, ob, 170))
}

#[cfg(test)]
#[path = "../../tests/unit/app/mod.rs"]
mod tests;
