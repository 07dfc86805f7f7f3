use std::process::Command;

use crate::foundation::core::Fps;
use crate::foundation::error::{DotboardError, DotboardResult};

/// A directly decodable stream location and its nominal frame rate.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStream {
    pub url: String,
    pub fps: Fps,
}

/// Turns a user-facing source (page URL, file path) into something `ffmpeg` can open.
///
/// Failing to reach the resolver is transient ([`DotboardError::Source`]); a source that
/// exists but has no usable stream is [`DotboardError::Setup`] and halts the producer.
pub trait StreamResolver: Send + Sync {
    fn resolve(&self, source: &str) -> DotboardResult<ResolvedStream>;
}

/// Resolves video pages through the `yt-dlp` executable.
#[derive(Clone, Debug)]
pub struct YtDlpResolver {
    /// Exact format height to pick, e.g. 360.
    pub desired_height: u32,
    pub program: String,
}

impl YtDlpResolver {
    pub fn new(desired_height: u32) -> Self {
        Self {
            desired_height,
            program: "yt-dlp".to_owned(),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct YtFormat {
    height: Option<u32>,
    url: Option<String>,
    fps: Option<f64>,
}

#[derive(serde::Deserialize)]
struct YtInfo {
    #[serde(default)]
    formats: Vec<YtFormat>,
}

/// First format whose height matches exactly.
pub(crate) fn pick_format(formats: &[YtFormat], height: u32) -> DotboardResult<ResolvedStream> {
    let format = formats
        .iter()
        .find(|f| f.height == Some(height) && f.url.is_some())
        .ok_or_else(|| DotboardError::setup(format!("no {height}p format available")))?;
    let fps = Fps::from_f64(format.fps.unwrap_or(30.0))
        .map_err(|e| DotboardError::setup(format!("{height}p format has unusable fps: {e}")))?;
    Ok(ResolvedStream {
        url: format.url.clone().unwrap_or_default(),
        fps,
    })
}

impl StreamResolver for YtDlpResolver {
    #[tracing::instrument(skip(self), fields(height = self.desired_height))]
    fn resolve(&self, source: &str) -> DotboardResult<ResolvedStream> {
        let out = Command::new(&self.program)
            .args(["-J", "--no-warnings", "--skip-download"])
            .arg(source)
            .output()
            .map_err(|e| DotboardError::source(format!("failed to run {}: {e}", self.program)))?;
        if !out.status.success() {
            return Err(DotboardError::source(format!(
                "{} failed for '{source}': {}",
                self.program,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        let info: YtInfo = serde_json::from_slice(&out.stdout)
            .map_err(|e| DotboardError::source(format!("{} json parse failed: {e}", self.program)))?;
        let resolved = pick_format(&info.formats, self.desired_height)?;
        tracing::info!(fps = resolved.fps.as_f64(), "resolved stream");
        Ok(resolved)
    }
}

/// Probes a direct URL or file with `ffprobe` and passes it through unchanged.
#[derive(Clone, Debug, Default)]
pub struct FfprobeResolver;

impl StreamResolver for FfprobeResolver {
    #[tracing::instrument(skip(self))]
    fn resolve(&self, source: &str) -> DotboardResult<ResolvedStream> {
        #[derive(serde::Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
            r_frame_rate: Option<String>,
            avg_frame_rate: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeOut {
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        let out = Command::new("ffprobe")
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(source)
            .output()
            .map_err(|e| DotboardError::source(format!("failed to run ffprobe: {e}")))?;
        if !out.status.success() {
            return Err(DotboardError::source(format!(
                "ffprobe failed for '{source}': {}",
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
            .map_err(|e| DotboardError::source(format!("ffprobe json parse failed: {e}")))?;
        let video = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| DotboardError::setup(format!("no video stream in '{source}'")))?;
        let (num, den) = [&video.avg_frame_rate, &video.r_frame_rate]
            .into_iter()
            .filter_map(|r| r.as_deref().and_then(parse_ff_ratio))
            .next()
            .ok_or_else(|| DotboardError::setup("video stream has no usable frame rate"))?;
        Ok(ResolvedStream {
            url: source.to_owned(),
            fps: Fps::new(num, den)?,
        })
    }
}

/// Parse an `ffprobe` rate like `30000/1001`. Zero rates count as missing.
pub(crate) fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let (a, b) = s.split_once('/')?;
    let a = a.trim().parse::<u32>().ok()?;
    let b = b.trim().parse::<u32>().ok()?;
    if a == 0 || b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[path = "../../tests/unit/stream/resolve.rs"]
mod tests;
