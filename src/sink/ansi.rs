use std::fmt::Write as _;
use std::io::Write;

use anyhow::Context as _;

use crate::foundation::error::DotboardResult;
use crate::frame::buffer::FrameBuffer;
use crate::sink::DisplaySink;

/// True-colour terminal preview, two pixel rows per text line using `▀`.
pub struct AnsiSink<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> AnsiSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl AnsiSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

/// Render `frame` as escape sequences, cursor homed first. Alpha is ignored.
pub fn render_ansi(frame: &FrameBuffer) -> String {
    let mut s = String::from("\x1b[H");
    for y in (0..frame.height()).step_by(2) {
        for x in 0..frame.width() {
            let top = frame.pixel(x, y);
            let bottom = if y + 1 < frame.height() {
                frame.pixel(x, y + 1)
            } else {
                [0, 0, 0, 255]
            };
            let _ = write!(
                s,
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m▀",
                top[0], top[1], top[2], bottom[0], bottom[1], bottom[2]
            );
        }
        s.push_str("\x1b[0m\n");
    }
    s
}

impl<W: Write + Send> DisplaySink for AnsiSink<W> {
    fn present(&mut self, frame: &FrameBuffer) -> DotboardResult<()> {
        self.out
            .write_all(render_ansi(frame).as_bytes())
            .context("write terminal frame")?;
        self.out.flush().context("flush terminal")?;
        Ok(())
    }

    fn finish(&mut self) -> DotboardResult<()> {
        self.out.write_all(b"\x1b[0m").context("reset terminal")?;
        self.out.flush().context("flush terminal")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sink/ansi.rs"]
mod tests;
