#![forbid(unsafe_code)]

pub mod animation;
pub mod app;
pub mod compose;
pub mod config;
pub mod controller;
pub mod foundation;
pub mod frame;
pub mod layer;
pub mod mailbox;
pub mod renderer;
pub mod sink;
pub mod stream;
pub mod text;

pub use animation::ease::Ease;
pub use app::stop::{StopHandle, StopToken, stop_pair};
pub use app::{AppHandle, AppInstance, AppKind, Next, Producer, ProducerContext, create_app};
pub use compose::{ColorRemap, Compositor, CompositorSettings, alpha_blend};
pub use config::{Config, ConfigWatcher, RawAppConfig};
pub use controller::{Controller, RunLimits};
pub use foundation::clock::{Clock, ManualClock, SystemClock};
pub use foundation::core::{Anchor, Canvas, Fps, Padding, Rgb8, Rgba8};
pub use foundation::error::{DotboardError, DotboardResult};
pub use frame::buffer::FrameBuffer;
pub use layer::{
    BackgroundLayer, Layer, LayerKind, NotificationLayer, NotificationUpdate, WidgetLayer,
    WidgetUpdate,
};
pub use mailbox::{MailboxReceiver, MailboxSender, Overflow, mailbox};
pub use renderer::Renderer;
pub use sink::png::write_png;
pub use sink::{AnsiSink, DisplaySink, InMemorySink, NullSink, PngSink};
pub use stream::{FramePacer, StreamFrame, StreamScheduler};
pub use text::{SvgTextRenderer, TextRenderer, TextStyle};
