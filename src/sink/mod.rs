//! Display sinks: where finished frames go.

pub mod ansi;
pub mod png;

use crate::foundation::error::DotboardResult;
use crate::frame::buffer::FrameBuffer;

pub use ansi::AnsiSink;
pub use png::PngSink;

/// Accepts composited frames at whatever rate they are delivered.
///
/// `present` must not block for longer than one display tick.
pub trait DisplaySink: Send {
    fn present(&mut self, frame: &FrameBuffer) -> DotboardResult<()>;

    /// Flush anything buffered. Called once when the render loop ends.
    fn finish(&mut self) -> DotboardResult<()> {
        Ok(())
    }
}

/// Keeps every presented frame. For tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    frames: Vec<FrameBuffer>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[FrameBuffer] {
        &self.frames
    }

    pub fn last(&self) -> Option<&FrameBuffer> {
        self.frames.last()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl DisplaySink for InMemorySink {
    fn present(&mut self, frame: &FrameBuffer) -> DotboardResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> DotboardResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Discards frames. Useful for measuring the pipeline alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn present(&mut self, _frame: &FrameBuffer) -> DotboardResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sink/mod.rs"]
mod tests;
