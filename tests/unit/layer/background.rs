use super::*;
use crate::foundation::core::Rgba8;
use crate::mailbox::{Overflow, mailbox};

const CANVAS: Canvas = Canvas {
    width: 4,
    height: 2,
};

fn opaque(v: u8) -> FrameBuffer {
    FrameBuffer::filled(4, 2, Rgba8::new(v, v, v, 255))
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn blank_until_first_frame() {
    let mut layer = BackgroundLayer::new(CANVAS);
    let (_tx, rx) = mailbox(1, Overflow::DropOldest);
    layer.connect(rx);
    assert!(layer.frame(Instant::now()).is_fully_transparent());
    assert!(!layer.is_active());
}

#[test]
fn fades_in_after_activation() {
    let mut layer = BackgroundLayer::new(CANVAS);
    let (tx, rx) = mailbox(1, Overflow::DropOldest);
    layer.connect(rx);
    let t0 = Instant::now();
    tx.push(opaque(10)).unwrap();

    assert_eq!(layer.frame(t0).pixel(0, 0)[3], 0);
    // opacity(0.4 / 0.8) = 1 - 0.5^3 = 0.875
    assert_eq!(layer.frame(t0 + ms(400)).pixel(0, 0)[3], 223);
    assert_eq!(layer.frame(t0 + ms(800)).pixel(0, 0), [10, 10, 10, 255]);
}

#[test]
fn latest_frame_wins_and_activation_is_kept() {
    let mut layer = BackgroundLayer::new(CANVAS);
    let (tx, rx) = mailbox(3, Overflow::DropOldest);
    layer.connect(rx);
    let t0 = Instant::now();
    tx.push(opaque(1)).unwrap();
    layer.frame(t0);
    tx.push(opaque(2)).unwrap();
    tx.push(opaque(3)).unwrap();
    let out = layer.frame(t0 + ms(900));
    assert_eq!(out.pixel(3, 1), [3, 3, 3, 255]);
}

#[test]
fn wrong_size_is_rejected() {
    let mut layer = BackgroundLayer::new(CANVAS);
    let (tx, rx) = mailbox(3, Overflow::DropOldest);
    layer.connect(rx);
    let t0 = Instant::now();
    tx.push(opaque(7)).unwrap();
    layer.frame(t0);
    tx.push(FrameBuffer::filled(3, 2, Rgba8::new(9, 9, 9, 255))).unwrap();
    assert_eq!(layer.frame(t0 + ms(900)).pixel(0, 0), [7, 7, 7, 255]);
}

#[test]
fn clear_resets_activation_and_drains() {
    let mut layer = BackgroundLayer::new(CANVAS);
    let (tx, rx) = mailbox(3, Overflow::DropOldest);
    layer.connect(rx);
    let t0 = Instant::now();
    tx.push(opaque(7)).unwrap();
    layer.frame(t0);
    tx.push(opaque(8)).unwrap();
    layer.clear();
    assert!(!layer.is_active());
    assert!(layer.frame(t0 + ms(900)).is_fully_transparent());

    tx.push(opaque(9)).unwrap();
    let t1 = t0 + Duration::from_secs(5);
    assert_eq!(layer.frame(t1).pixel(0, 0)[3], 0, "fade restarts after clear");
}

#[test]
fn stale_frame_dims_but_stays_visible() {
    let mut layer = BackgroundLayer::new(CANVAS);
    let (tx, rx) = mailbox(1, Overflow::DropOldest);
    layer.connect(rx);
    let t0 = Instant::now();
    tx.push(opaque(200)).unwrap();
    layer.frame(t0);

    let fresh = layer.frame(t0 + Duration::from_secs(2));
    assert_eq!(fresh.pixel(0, 0)[3], 255);

    let stale = layer.frame(t0 + Duration::from_secs(10));
    assert_eq!(stale.pixel(0, 0)[3], 89);
    assert_eq!(stale.pixel(0, 0)[0], 200);

    tx.push(opaque(100)).unwrap();
    let recovered = layer.frame(t0 + Duration::from_secs(11));
    assert_eq!(recovered.pixel(0, 0), [100, 100, 100, 255]);
}

#[test]
fn disconnect_closes_the_mailbox() {
    let mut layer = BackgroundLayer::new(CANVAS);
    let (tx, rx) = mailbox(1, Overflow::DropOldest);
    layer.connect(rx);
    layer.disconnect_all();
    assert!(tx.is_closed());
}
