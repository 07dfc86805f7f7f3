use crate::app::image::STILL_REFRESH;
use crate::app::{Next, Producer, ProducerContext, glyph_style};
use crate::foundation::core::{Anchor, Canvas, Padding};
use crate::foundation::error::DotboardResult;
use crate::frame::buffer::FrameBuffer;
use crate::frame::ops::{contain, vstack};

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct SetupOptions {
    pub lines: Vec<String>,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            lines: vec![
                "Edit config.json".to_owned(),
                "to choose what".to_owned(),
                "to display".to_owned(),
            ],
        }
    }
}

/// Background with centred first-run instructions.
pub struct SetupApp {
    lines: Vec<String>,
    frame: Option<FrameBuffer>,
}

impl SetupApp {
    pub const LINE_HEIGHT: u32 = 8;

    pub fn new(opts: SetupOptions) -> Self {
        Self {
            lines: opts.lines,
            frame: None,
        }
    }

    /// Lines stacked top to bottom; the block is centred on the canvas and clipped to it.
    pub fn render(&self, ctx: &ProducerContext<FrameBuffer>) -> DotboardResult<FrameBuffer> {
        let canvas = ctx.canvas();
        let container = Canvas::new(canvas.width, Self::LINE_HEIGHT);
        let style = glyph_style();
        let rows = self
            .lines
            .iter()
            .map(|line| {
                ctx.text()
                    .render_string(line, &style, container, Anchor::TopMiddle, Padding::ZERO)
            })
            .collect::<DotboardResult<Vec<_>>>()?;
        let block = vstack(&rows)?;
        Ok(contain(&block, canvas, Anchor::Center, Padding::ZERO))
    }
}

impl Producer<FrameBuffer> for SetupApp {
    fn step(&mut self, ctx: &ProducerContext<FrameBuffer>) -> DotboardResult<Next> {
        let frame = match &self.frame {
            Some(f) => f.clone(),
            None => {
                let f = self.render(ctx)?;
                self.frame = Some(f.clone());
                f
            }
        };
        ctx.publish(frame)?;
        Ok(Next::After(STILL_REFRESH))
    }
}
