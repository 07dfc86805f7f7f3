use std::io::{ErrorKind, Read};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, SendTimeoutError, Sender};

use crate::app::stop::{StopHandle, StopToken, stop_pair};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::frame::buffer::FrameBuffer;
use crate::stream::scheduler::{StreamFrame, discard_buffered};

/// Percentages `[x1, y1, x2, y2]` of the source frame to keep.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct CropPercent {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl From<[f64; 4]> for CropPercent {
    fn from([x1, y1, x2, y2]: [f64; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<CropPercent> for [f64; 4] {
    fn from(c: CropPercent) -> Self {
        [c.x1, c.y1, c.x2, c.y2]
    }
}

impl CropPercent {
    pub fn validate(&self) -> DotboardResult<()> {
        let ok = |a: f64, b: f64| {
            (0.0..=100.0).contains(&a) && (0.0..=100.0).contains(&b) && a < b
        };
        if ok(self.x1, self.x2) && ok(self.y1, self.y2) {
            Ok(())
        } else {
            Err(DotboardError::validation(format!(
                "crop {:?} must satisfy 0 <= x1 < x2 <= 100 and 0 <= y1 < y2 <= 100",
                <[f64; 4]>::from(*self)
            )))
        }
    }
}

#[derive(Clone, Debug)]
pub struct DecodeSettings {
    pub canvas: Canvas,
    pub crop: Option<CropPercent>,
    /// Pause before re-opening the source after it ends or fails.
    pub reconnect_delay: Duration,
    /// Seconds of decoded frames buffered ahead of the scheduler.
    pub buffer_secs: u32,
    pub program: String,
}

impl DecodeSettings {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            crop: None,
            reconnect_delay: Duration::from_secs(5),
            buffer_secs: 3,
            program: "ffmpeg".to_owned(),
        }
    }
}

/// The `-vf` chain: optional percentage crop, centre crop to the canvas aspect, area resize.
pub fn filter_chain(canvas: Canvas, crop: Option<CropPercent>) -> String {
    let mut filters = Vec::new();
    if let Some(c) = crop {
        filters.push(format!(
            "crop=iw*{w}/100:ih*{h}/100:iw*{x}/100:ih*{y}/100",
            w = c.x2 - c.x1,
            h = c.y2 - c.y1,
            x = c.x1,
            y = c.y1
        ));
    }
    let (w, h) = (canvas.width, canvas.height);
    filters.push(format!("crop='min(iw,ih*{w}/{h})':'min(ih,iw*{h}/{w})'"));
    filters.push(format!("scale={w}:{h}:flags=area"));
    filters.join(",")
}

pub fn ffmpeg_args(url: &str, settings: &DecodeSettings) -> Vec<String> {
    let mut args: Vec<String> = [
        "-hide_banner",
        "-loglevel",
        "error",
        "-nostdin",
        "-i",
        url,
        "-an",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect();
    args.push("-vf".to_owned());
    args.push(filter_chain(settings.canvas, settings.crop));
    args.extend(
        ["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"]
            .into_iter()
            .map(str::to_owned),
    );
    args
}

/// A background thread feeding decoded frames from an `ffmpeg` child process.
///
/// The child is re-spawned after every unexpected end, each time under a new generation.
/// Decoding blocks when the bounded frame buffer is full. Dropping the decoder kills the
/// child and joins the thread.
pub struct StreamDecoder {
    frames: Receiver<StreamFrame>,
    child: Arc<Mutex<Option<Child>>>,
    stop: StopHandle,
    thread: Option<JoinHandle<()>>,
}

impl StreamDecoder {
    pub fn spawn(url: String, fps: Fps, settings: DecodeSettings) -> DotboardResult<Self> {
        let capacity = (f64::from(settings.buffer_secs) * fps.as_f64()).ceil().max(1.0) as usize;
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        let child = Arc::new(Mutex::new(None));
        let (stop, token) = stop_pair();

        let slot = child.clone();
        let buffered = rx.clone();
        let thread = std::thread::Builder::new()
            .name("stream-decode".to_owned())
            .spawn(move || decode_loop(&url, &settings, &tx, &buffered, &slot, &token))
            .map_err(|e| DotboardError::source(format!("failed to spawn decode thread: {e}")))?;

        Ok(Self {
            frames: rx,
            child,
            stop,
            thread: Some(thread),
        })
    }

    pub fn frames(&self) -> Receiver<StreamFrame> {
        self.frames.clone()
    }
}

impl Drop for StreamDecoder {
    fn drop(&mut self) {
        self.stop.stop();
        kill_child(&self.child);
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::error!("stream decode thread panicked");
        }
    }
}

fn kill_child(slot: &Mutex<Option<Child>>) {
    let mut guard = slot.lock().unwrap_or_else(|p| p.into_inner());
    if let Some(mut child) = guard.take() {
        let _ = child.kill();
        let _ = child.wait();
    }
}

fn decode_loop(
    url: &str,
    settings: &DecodeSettings,
    tx: &Sender<StreamFrame>,
    buffered: &Receiver<StreamFrame>,
    slot: &Mutex<Option<Child>>,
    stop: &StopToken,
) {
    let mut generation = 0u64;
    loop {
        let outcome = decode_once(url, settings, generation, tx, slot, stop);
        kill_child(slot);
        match outcome {
            Ok(frames) => tracing::warn!(generation, frames, "video stream ended unexpectedly"),
            Err(DotboardError::Stopped) => return,
            Err(e) => tracing::warn!(generation, error = %e, "video decode failed"),
        }
        if stop.wait(settings.reconnect_delay) {
            return;
        }
        let dropped = discard_buffered(buffered);
        generation += 1;
        tracing::info!(generation, dropped, "reconnecting video stream");
    }
}

/// Run one `ffmpeg` child to completion. Returns the number of frames delivered.
fn decode_once(
    url: &str,
    settings: &DecodeSettings,
    generation: u64,
    tx: &Sender<StreamFrame>,
    slot: &Mutex<Option<Child>>,
    stop: &StopToken,
) -> DotboardResult<u64> {
    let mut child = Command::new(&settings.program)
        .args(ffmpeg_args(url, settings))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            DotboardError::source(format!(
                "failed to spawn {} (is it installed and on PATH?): {e}",
                settings.program
            ))
        })?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| DotboardError::source("failed to open ffmpeg stdout (unexpected)"))?;
    if let Some(mut stderr) = child.stderr.take() {
        std::thread::spawn(move || {
            let mut bytes = Vec::new();
            if stderr.read_to_end(&mut bytes).is_ok() && !bytes.is_empty() {
                tracing::debug!(stderr = %String::from_utf8_lossy(&bytes).trim(), "ffmpeg stderr");
            }
        });
    }
    *slot.lock().unwrap_or_else(|p| p.into_inner()) = Some(child);
    // A stop that raced the spawn is caught here; later ones kill the child and end the read.
    stop.check()?;

    let canvas = settings.canvas;
    let mut buf = vec![0u8; canvas.byte_len()];
    let mut delivered = 0u64;
    loop {
        match stdout.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(delivered),
            Err(e) => return Err(DotboardError::source(format!("ffmpeg read failed: {e}"))),
        }
        let frame = FrameBuffer::new(canvas.width, canvas.height, buf.clone())?;
        send(tx, StreamFrame { generation, frame }, stop)?;
        delivered += 1;
        stop.check()?;
    }
}

fn send(tx: &Sender<StreamFrame>, mut item: StreamFrame, stop: &StopToken) -> DotboardResult<()> {
    loop {
        match tx.send_timeout(item, Duration::from_millis(100)) {
            Ok(()) => return Ok(()),
            Err(SendTimeoutError::Disconnected(_)) => return Err(DotboardError::Stopped),
            Err(SendTimeoutError::Timeout(back)) => {
                stop.check()?;
                item = back;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stream/decode.rs"]
mod tests;
