use std::sync::Arc;

use super::*;
use crate::app::stop::stop_pair;
use crate::compose::blend::{BACKGROUND_MARKER, FOREGROUND_MARKER};
use crate::foundation::clock::ManualClock;
use crate::layer::NotificationLayer;
use crate::mailbox::{Overflow, mailbox};
use crate::text::SvgTextRenderer;

fn blank_text() -> SvgTextRenderer {
    SvgTextRenderer::with_fontdb(Arc::default())
}

#[test]
fn card_fits_the_notification_layout() {
    let layout = NotificationLayer::DEFAULT_LAYOUT;
    let card = notification_card(&blank_text(), Some("5 min"), "Standup").unwrap();
    assert_eq!(card.width(), layout.width);
    assert_eq!(card.height(), LABEL_HEIGHT + TITLE_HEIGHT + 1);
    assert!(card.height() <= layout.max_height);

    let plain = notification_card(&blank_text(), None, "Hello").unwrap();
    assert_eq!(plain.height(), TITLE_HEIGHT + 1);
}

#[test]
fn accent_bar_uses_marker_colours() {
    let card = notification_card(&blank_text(), None, "x").unwrap();
    let fg = FOREGROUND_MARKER.to_array();
    let bg = BACKGROUND_MARKER.to_array();
    assert_eq!(card.pixel(1, 3), [fg[0], fg[1], fg[2], 255]);
    assert_eq!(card.pixel(0, 3), [bg[0], bg[1], bg[2], 170]);
    // Bottom of the bar and the spacer row stay clear.
    assert_eq!(card.pixel(1, TITLE_HEIGHT - 1)[3], 0);
    assert_eq!(card.pixel(1, TITLE_HEIGHT)[3], 0);
}

#[test]
fn each_event_is_published_under_its_key() {
    let opts: CalendarOptions = serde_json::from_value(serde_json::json!({
        "events": [
            {"key": "cal-1", "title": "Weekly sync", "minutes": 1},
            {"key": "cal-2", "title": "Lunch", "minutes": 20, "duration_secs": 5}
        ],
        "interval_secs": 0
    }))
    .unwrap();
    let mut app = CalendarApp::new(opts).unwrap();
    let (tx, rx) = mailbox(3, Overflow::Block);
    let (_stop, token) = stop_pair();
    let ctx = ProducerContext::new(
        tx,
        token,
        Canvas::MATRIX,
        Arc::new(blank_text()),
        Arc::new(ManualClock::new()),
    );
    assert_eq!(app.step(&ctx).unwrap(), Next::Done);
    let got: Vec<_> = rx.drain().collect();
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].key, "cal-1");
    assert_eq!(got[0].duration, Duration::from_secs(15));
    assert_eq!(got[1].duration, Duration::from_secs(5));
}

#[test]
fn events_need_keys() {
    let opts = CalendarOptions {
        events: vec![CalendarEvent {
            key: String::new(),
            title: "t".to_owned(),
            minutes: 1,
            duration_secs: 1,
        }],
        interval_secs: 10,
    };
    assert!(CalendarApp::new(opts).is_err());
}
