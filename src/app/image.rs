use std::path::PathBuf;
use std::time::Duration;

use crate::app::{Next, Producer, ProducerContext};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::frame::buffer::FrameBuffer;
use crate::frame::ops::fit_cover;

/// How often a still background is re-sent so the layer never treats it as stale.
pub(crate) const STILL_REFRESH: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    pub path: PathBuf,
}

/// Background still image, cropped to cover the canvas.
pub struct ImageApp {
    path: PathBuf,
    frame: Option<FrameBuffer>,
}

impl ImageApp {
    pub fn new(opts: ImageOptions) -> DotboardResult<Self> {
        if opts.path.as_os_str().is_empty() {
            return Err(DotboardError::validation("image needs a path"));
        }
        Ok(Self {
            path: opts.path,
            frame: None,
        })
    }

    fn load(&self, ctx: &ProducerContext<FrameBuffer>) -> DotboardResult<FrameBuffer> {
        let img = image::open(&self.path).map_err(|e| {
            DotboardError::source(format!("failed to load '{}': {e}", self.path.display()))
        })?;
        tracing::debug!(path = %self.path.display(), "background image loaded");
        fit_cover(&img.to_rgba8(), ctx.canvas())
    }
}

impl Producer<FrameBuffer> for ImageApp {
    fn step(&mut self, ctx: &ProducerContext<FrameBuffer>) -> DotboardResult<Next> {
        let frame = match &self.frame {
            Some(f) => f.clone(),
            None => {
                let f = self.load(ctx)?;
                self.frame = Some(f.clone());
                f
            }
        };
        ctx.publish(frame)?;
        Ok(Next::After(STILL_REFRESH))
    }
}
