use super::*;
use crate::foundation::core::Rgba8;
use crate::mailbox::{Overflow, mailbox};
use proptest::prelude::*;

const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);
const GREEN: Rgba8 = Rgba8::new(0, 255, 0, 255);
const BLUE: Rgba8 = Rgba8::new(0, 0, 255, 255);

fn layer(max_height: u32) -> NotificationLayer {
    NotificationLayer::with_layout(
        Canvas::MATRIX,
        StackLayout {
            width: 10,
            max_height,
            anchor: Anchor::TopLeft,
            padding: Padding::new(1, 0, 0, 1),
        },
    )
}

fn card(color: Rgba8, height: u32) -> FrameBuffer {
    FrameBuffer::filled(10, height, color)
}

fn secs(v: u64) -> Duration {
    Duration::from_secs(v)
}

#[test]
fn overflow_drops_oldest_entries() {
    let mut l = layer(20);
    let t0 = Instant::now();
    l.apply(NotificationUpdate::new("a", card(RED, 20), secs(60)), t0);
    l.apply(NotificationUpdate::new("b", card(GREEN, 20), secs(60)), t0 + secs(1));
    l.apply(NotificationUpdate::new("c", card(BLUE, 20), secs(60)), t0 + secs(2));

    let out = l.frame(t0 + secs(10));
    assert_eq!(out.canvas(), Canvas::MATRIX);
    assert_eq!(out.pixel(1, 1), BLUE.to_array());
    assert_eq!(out.pixel(1, 20), BLUE.to_array());
    assert_eq!(out.pixel(1, 21), GREEN.to_array());
    assert_eq!(out.pixel(1, 40), GREEN.to_array());
    assert_eq!(out.pixel(1, 41)[3], 0);
    assert!(
        out.data()
            .chunks_exact(4)
            .all(|px| px != RED.to_array().as_slice())
    );
}

#[test]
fn expired_entries_are_evicted() {
    let mut l = layer(15);
    let t0 = Instant::now();
    l.apply(NotificationUpdate::new("a", card(RED, 5), secs(5)), t0);
    l.frame(t0 + secs(5));
    assert_eq!(l.len(), 1, "still alive exactly at expiry");
    let out = l.frame(t0 + secs(6));
    assert!(l.is_empty());
    assert!(out.is_fully_transparent());
}

#[test]
fn malformed_updates_keep_previous_state() {
    let mut l = layer(15);
    let t0 = Instant::now();
    l.apply(NotificationUpdate::new("a", card(RED, 5), secs(5)), t0);
    l.apply(
        NotificationUpdate::new("a", FrameBuffer::filled(11, 5, GREEN), secs(50)),
        t0 + secs(1),
    );
    l.apply(NotificationUpdate::new("a", card(GREEN, 16), secs(50)), t0 + secs(1));
    let n = l.get("a").unwrap();
    assert_eq!(n.created, t0);
    assert_eq!(n.render.pixel(0, 0), RED.to_array());
}

#[test]
fn retrigger_restarts_enter_animation() {
    let mut l = layer(15);
    let t0 = Instant::now();
    l.apply(NotificationUpdate::new("a", card(RED, 5), secs(30)), t0);
    assert_eq!(l.frame(t0 + secs(2)).pixel(1, 1)[3], 255);
    l.apply(NotificationUpdate::new("a", card(RED, 5), secs(30)), t0 + secs(3));
    assert_eq!(l.frame(t0 + secs(3)).pixel(1, 1)[3], 0);
}

#[test]
fn older_entries_collapse_while_exiting() {
    let mut l = layer(10);
    let t0 = Instant::now();
    l.apply(NotificationUpdate::new("old", card(RED, 8), secs(10)), t0);
    l.apply(NotificationUpdate::new("new", card(BLUE, 8), secs(60)), t0 + secs(5));

    // 200ms before "old" expires: height factor 0.5^3 = 0.125 -> 1 row.
    let out = l.frame(t0 + secs(10) - Duration::from_millis(200));
    assert_eq!(out.pixel(1, 1), BLUE.to_array());
    assert_eq!(out.pixel(1, 8), BLUE.to_array());
    assert_eq!(out.pixel(1, 9)[0], 255);
    assert_eq!(out.pixel(1, 10)[3], 0);
}

#[test]
fn mailbox_updates_are_drained_on_frame() {
    let mut l = layer(15);
    let (tx, rx) = mailbox(3, Overflow::Block);
    l.connect(rx);
    tx.push(NotificationUpdate::new("x", card(GREEN, 4), secs(3)))
        .unwrap();
    let t0 = Instant::now();
    l.frame(t0);
    assert_eq!(l.get("x").unwrap().expires, t0 + secs(3));
    l.clear();
    assert!(l.is_empty());
}

proptest! {
    #[test]
    fn expiry_tracks_latest_update(durations in proptest::collection::vec(1u64..120, 1..12)) {
        let mut l = layer(15);
        let t0 = Instant::now();
        for (i, d) in durations.iter().enumerate() {
            let now = t0 + Duration::from_millis(i as u64 * 250);
            l.apply(NotificationUpdate::new("k", card(RED, 3), secs(*d)), now);
            let n = l.get("k").unwrap();
            prop_assert_eq!(n.created, now);
            prop_assert_eq!(n.expires, n.created + secs(*d));
        }
        prop_assert_eq!(l.len(), 1);
    }
}
