use super::*;

#[test]
fn two_rows_per_line() {
    let frame = FrameBuffer::from_fn(2, 3, |x, y| [x as u8, y as u8, 7, 255]);
    let s = render_ansi(&frame);
    let lines: Vec<&str> = s.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("\x1b[H\x1b[38;2;0;0;7m\x1b[48;2;0;1;7m▀"));
    // Odd last row pairs with black.
    assert!(lines[1].contains("\x1b[38;2;1;2;7m\x1b[48;2;0;0;0m▀"));
}

#[test]
fn sink_writes_to_its_writer() {
    let mut sink = AnsiSink::new(Vec::new());
    sink.present(&FrameBuffer::transparent(1, 2)).unwrap();
    sink.finish().unwrap();
    let bytes = sink.into_inner();
    assert!(String::from_utf8(bytes).unwrap().ends_with("\x1b[0m"));
}
