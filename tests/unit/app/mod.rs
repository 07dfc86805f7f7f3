use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::compose::compositor::CompositorSettings;
use crate::foundation::clock::ManualClock;
use crate::mailbox::{Overflow, mailbox};
use crate::text::SvgTextRenderer;

fn blank_text() -> Arc<dyn TextRenderer> {
    Arc::new(SvgTextRenderer::with_fontdb(Arc::default()))
}

fn context<U>(tx: MailboxSender<U>, stop: StopToken) -> ProducerContext<U> {
    ProducerContext::new(tx, stop, Canvas::MATRIX, blank_text(), Arc::new(ManualClock::new()))
}

#[test]
fn kinds_round_trip_through_names() {
    for kind in AppKind::ALL {
        assert_eq!(AppKind::from_name(kind.name()), Some(kind));
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{}\"", kind.name()));
    }
    assert_eq!(AppKind::from_name("astronaut_io"), None);
}

#[test]
fn kinds_map_to_layers() {
    assert_eq!(AppKind::Time.layer(), LayerKind::Widget);
    assert_eq!(AppKind::YtStream.layer(), LayerKind::Background);
    assert_eq!(AppKind::Message.layer(), LayerKind::Notification);
}

#[test]
fn registry_builds_the_layer_it_declares() {
    let cases = [
        (AppKind::Time, serde_json::Value::Null),
        (AppKind::Weather, serde_json::json!({"api_key": "k"})),
        (AppKind::YtStream, serde_json::json!({"url": "https://youtu.be/x"})),
        (AppKind::Video, serde_json::json!({"url": "clip.mp4", "crop": [0, 0, 100, 50]})),
        (AppKind::Image, serde_json::json!({"path": "bg.png"})),
        (AppKind::Setup, serde_json::Value::Null),
        (AppKind::Calendar, serde_json::json!({"events": []})),
        (AppKind::Message, serde_json::json!({"text": "hi"})),
    ];
    for (kind, options) in cases {
        let app = create_app(kind, options).unwrap_or_else(|e| panic!("{kind}: {e}"));
        assert_eq!(app.layer(), kind.layer(), "{kind}");
    }
}

#[test]
fn registry_rejects_bad_options() {
    assert!(matches!(
        create_app(AppKind::Time, serde_json::json!({"format": 5})),
        Err(DotboardError::Validation(_))
    ));
    assert!(create_app(AppKind::Weather, serde_json::Value::Null).is_err());
}

struct Flaky {
    calls: Arc<AtomicUsize>,
    fail_with: fn() -> DotboardError,
    fail_times: usize,
}

impl Producer<u32> for Flaky {
    fn step(&mut self, ctx: &ProducerContext<u32>) -> DotboardResult<Next> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_times {
            return Err((self.fail_with)());
        }
        ctx.publish(n as u32)?;
        Ok(Next::Done)
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(1)
    }
}

#[test]
fn transient_failures_are_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut p = Flaky {
        calls: calls.clone(),
        fail_with: || DotboardError::source("network down"),
        fail_times: 2,
    };
    let (tx, rx) = mailbox(3, Overflow::Block);
    let (_stop, token) = stop_pair();
    run_producer(AppKind::Message, &mut p, &context(tx, token));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(rx.try_pop(), Some(2));
}

#[test]
fn setup_failures_halt() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut p = Flaky {
        calls: calls.clone(),
        fail_with: || DotboardError::setup("no format"),
        fail_times: 10,
    };
    let (tx, rx) = mailbox(3, Overflow::Block);
    let (_stop, token) = stop_pair();
    run_producer(AppKind::Message, &mut p, &context(tx, token));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(rx.is_empty());
}

#[test]
fn closed_mailbox_ends_the_producer() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut p = Flaky {
        calls: calls.clone(),
        fail_with: || DotboardError::source("unused"),
        fail_times: 0,
    };
    let (tx, rx) = mailbox::<u32>(1, Overflow::Block);
    drop(rx);
    let (_stop, token) = stop_pair();
    run_producer(AppKind::Message, &mut p, &context(tx, token));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

struct Ticker;

impl Producer<FrameBuffer> for Ticker {
    fn step(&mut self, ctx: &ProducerContext<FrameBuffer>) -> DotboardResult<Next> {
        let canvas = ctx.canvas();
        ctx.publish(FrameBuffer::filled(
            canvas.width,
            canvas.height,
            Rgba8::new(9, 9, 9, 255),
        ))?;
        Ok(Next::After(Duration::from_millis(5)))
    }
}

struct Crasher(Arc<Mutex<bool>>);

impl Producer<WidgetUpdate> for Crasher {
    fn step(&mut self, _ctx: &ProducerContext<WidgetUpdate>) -> DotboardResult<Next> {
        *self.0.lock().unwrap() = true;
        panic!("boom");
    }
}

#[test]
fn started_producer_feeds_its_layer_and_stops() {
    let mut compositor =
        Compositor::new(CompositorSettings::default(), Arc::new(ManualClock::new())).unwrap();
    let handle = AppInstance::Background(Box::new(Ticker))
        .start(AppKind::Image, &mut compositor, blank_text())
        .unwrap();
    assert_eq!(handle.kind(), AppKind::Image);
    assert_eq!(compositor.background().sources(), 1);

    let deadline = Instant::now() + Duration::from_secs(5);
    while !compositor.background().is_active() && Instant::now() < deadline {
        compositor.get_frame().unwrap();
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(compositor.background().is_active());

    handle.stop();
    handle.stop();
    handle.join();
}

#[test]
fn panicking_producer_does_not_take_down_the_caller() {
    let mut compositor =
        Compositor::new(CompositorSettings::default(), Arc::new(ManualClock::new())).unwrap();
    let ran = Arc::new(Mutex::new(false));
    let handle = AppInstance::Widget(Box::new(Crasher(ran.clone())))
        .start(AppKind::Time, &mut compositor, blank_text())
        .unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while !handle.is_finished() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(handle.is_finished());
    assert!(*ran.lock().unwrap());
    assert!(compositor.get_frame().is_ok());
    handle.join();
}

struct Cadenced {
    left: u32,
}

impl Producer<u32> for Cadenced {
    fn step(&mut self, ctx: &ProducerContext<u32>) -> DotboardResult<Next> {
        ctx.publish(self.left)?;
        if self.left == 0 {
            return Ok(Next::Done);
        }
        self.left -= 1;
        Ok(Next::After(Duration::from_secs(60)))
    }
}

#[test]
fn producer_cadence_runs_on_the_injected_clock() {
    let clock = ManualClock::new();
    let start = clock.now();
    let (tx, rx) = mailbox(3, Overflow::Block);
    let (_stop, token) = stop_pair();
    let ctx = ProducerContext::new(
        tx,
        token,
        Canvas::MATRIX,
        blank_text(),
        Arc::new(clock.clone()),
    );

    let wall = Instant::now();
    run_producer(AppKind::Message, &mut Cadenced { left: 2 }, &ctx);
    assert!(wall.elapsed() < Duration::from_secs(5));
    assert_eq!(clock.now() - start, Duration::from_secs(120));
    assert_eq!(rx.drain().collect::<Vec<_>>(), vec![2, 1, 0]);
}

#[test]
fn stopped_producer_does_not_advance_the_clock() {
    let clock = ManualClock::new();
    let start = clock.now();
    let (tx, _rx) = mailbox(3, Overflow::DropOldest);
    let (stop, token) = stop_pair();
    let ctx = ProducerContext::new(
        tx,
        token,
        Canvas::MATRIX,
        blank_text(),
        Arc::new(clock.clone()),
    );
    stop.stop();
    run_producer(AppKind::Message, &mut Cadenced { left: 5 }, &ctx);
    assert_eq!(clock.now(), start);
}
