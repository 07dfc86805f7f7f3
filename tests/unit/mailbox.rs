use super::*;

#[test]
fn fifo_order_is_preserved() {
    let (tx, rx) = mailbox(3, Overflow::Block);
    for i in 0..3 {
        tx.push(i).unwrap();
    }
    assert_eq!(rx.drain().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert!(rx.is_empty());
    assert_eq!(rx.try_pop(), None);
}

#[test]
fn drop_oldest_admits_newest() {
    let (tx, rx) = mailbox(2, Overflow::DropOldest);
    for i in 0..5 {
        tx.push(i).unwrap();
    }
    assert_eq!(tx.evicted(), 3);
    assert_eq!(rx.len(), 2);
    assert_eq!(rx.try_pop(), Some(3));
    assert_eq!(rx.try_pop(), Some(4));
}

#[test]
fn blocking_push_waits_for_room() {
    let (tx, rx) = mailbox(1, Overflow::Block);
    tx.push(1).unwrap();
    let writer = std::thread::spawn(move || tx.push(2));
    std::thread::sleep(Duration::from_millis(80));
    assert_eq!(rx.try_pop(), Some(1));
    writer.join().unwrap().unwrap();
    assert_eq!(rx.try_pop(), Some(2));
}

#[test]
fn push_after_reader_dropped_reports_stopped() {
    for overflow in [Overflow::Block, Overflow::DropOldest] {
        let (tx, rx) = mailbox::<u8>(1, overflow);
        drop(rx);
        assert!(tx.is_closed());
        assert!(matches!(tx.push(1), Err(DotboardError::Stopped)));
    }
}

#[test]
fn blocked_writer_is_released_when_reader_goes_away() {
    let (tx, rx) = mailbox(1, Overflow::Block);
    tx.push(0u8).unwrap();
    let writer = std::thread::spawn(move || tx.push(1));
    std::thread::sleep(Duration::from_millis(20));
    drop(rx);
    assert!(matches!(writer.join().unwrap(), Err(DotboardError::Stopped)));
}
