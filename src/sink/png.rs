use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context as _;

use crate::foundation::error::DotboardResult;
use crate::frame::buffer::FrameBuffer;
use crate::sink::DisplaySink;

/// Writes the latest frame to a PNG file, at most once per interval and once more on finish.
#[derive(Debug)]
pub struct PngSink {
    path: PathBuf,
    min_interval: Duration,
    last_write: Option<Instant>,
    pending: Option<FrameBuffer>,
    written: u64,
}

impl PngSink {
    pub fn new(path: impl Into<PathBuf>, min_interval: Duration) -> Self {
        Self {
            path: path.into(),
            min_interval,
            last_write: None,
            pending: None,
            written: 0,
        }
    }

    /// Number of times the file has been written.
    pub fn written(&self) -> u64 {
        self.written
    }

    fn write(&mut self, frame: &FrameBuffer) -> DotboardResult<()> {
        write_png(&self.path, frame)?;
        self.last_write = Some(Instant::now());
        self.written += 1;
        Ok(())
    }
}

/// Save `frame` as an RGBA PNG, creating parent directories.
pub fn write_png(path: &std::path::Path, frame: &FrameBuffer) -> DotboardResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        frame.data(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

impl DisplaySink for PngSink {
    fn present(&mut self, frame: &FrameBuffer) -> DotboardResult<()> {
        let due = self
            .last_write
            .is_none_or(|t| t.elapsed() >= self.min_interval);
        if due {
            self.pending = None;
            self.write(frame)
        } else {
            self.pending = Some(frame.clone());
            Ok(())
        }
    }

    fn finish(&mut self) -> DotboardResult<()> {
        if let Some(frame) = self.pending.take() {
            self.write(&frame)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sink/png.rs"]
mod tests;
