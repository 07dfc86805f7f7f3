use std::time::Duration;

use crate::app::{Next, Producer, ProducerContext};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::frame::buffer::FrameBuffer;
use crate::stream::decode::{CropPercent, DecodeSettings, StreamDecoder};
use crate::stream::resolve::{FfprobeResolver, StreamResolver, YtDlpResolver};
use crate::stream::scheduler::StreamScheduler;

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct YtStreamOptions {
    pub url: String,
    /// Exact format height to pick.
    pub desired_quality: u32,
    pub crop: Option<CropPercent>,
}

impl Default for YtStreamOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            desired_quality: 360,
            crop: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct VideoOptions {
    /// File path or direct stream URL.
    pub url: String,
    pub crop: Option<CropPercent>,
}

struct Session {
    // Dropped in declaration order: the frame receiver closes before the decoder joins.
    scheduler: StreamScheduler,
    _decoder: StreamDecoder,
}

/// Background video: resolve, decode in an `ffmpeg` child, pace to the nominal rate.
pub struct StreamApp {
    source: String,
    crop: Option<CropPercent>,
    resolver: Box<dyn StreamResolver>,
    session: Option<Session>,
    reconnect_delay: Duration,
}

impl StreamApp {
    pub fn youtube(opts: YtStreamOptions) -> DotboardResult<Self> {
        Self::with_resolver(
            opts.url,
            opts.crop,
            Box::new(YtDlpResolver::new(opts.desired_quality)),
        )
    }

    pub fn video(opts: VideoOptions) -> DotboardResult<Self> {
        Self::with_resolver(opts.url, opts.crop, Box::new(FfprobeResolver))
    }

    pub fn with_resolver(
        source: String,
        crop: Option<CropPercent>,
        resolver: Box<dyn StreamResolver>,
    ) -> DotboardResult<Self> {
        if source.trim().is_empty() {
            return Err(DotboardError::validation("stream needs a url"));
        }
        if let Some(c) = crop {
            c.validate()?;
        }
        Ok(Self {
            source,
            crop,
            resolver,
            session: None,
            reconnect_delay: Duration::from_secs(5),
        })
    }

    fn open(&self, ctx: &ProducerContext<FrameBuffer>) -> DotboardResult<Session> {
        let resolved = self.resolver.resolve(&self.source)?;
        let mut settings = DecodeSettings::new(ctx.canvas());
        settings.crop = self.crop;
        settings.reconnect_delay = self.reconnect_delay;
        let decoder = StreamDecoder::spawn(resolved.url, resolved.fps, settings)?;
        let scheduler = StreamScheduler::new(decoder.frames(), resolved.fps, ctx.clock().clone());
        tracing::info!(source = %self.source, fps = resolved.fps.as_f64(), "stream opened");
        Ok(Session {
            scheduler,
            _decoder: decoder,
        })
    }
}

impl Producer<FrameBuffer> for StreamApp {
    fn step(&mut self, ctx: &ProducerContext<FrameBuffer>) -> DotboardResult<Next> {
        if self.session.is_none() {
            self.session = Some(self.open(ctx)?);
        }
        let Some(session) = self.session.as_mut() else {
            return Err(DotboardError::source("stream session missing"));
        };
        match session.scheduler.next_frame(ctx.stop()) {
            Ok(frame) => {
                ctx.publish(frame)?;
                Ok(Next::After(Duration::ZERO))
            }
            Err(e) => {
                self.session = None;
                Err(e)
            }
        }
    }

    fn retry_delay(&self) -> Duration {
        self.reconnect_delay
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/stream.rs"]
mod tests;
