//! String rasterization for producers.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::{Anchor, Canvas, Padding, Rgba8};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::frame::buffer::FrameBuffer;

/// Font and paint for one rendered string.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// CSS font-family list.
    pub family: String,
    pub size_px: f32,
    pub color: Rgba8,
    /// Stroke painted under the fill.
    pub outline: Option<Rgba8>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: "DejaVu Sans Mono, monospace".to_owned(),
            size_px: 8.0,
            color: Rgba8::new(255, 255, 255, 255),
            outline: None,
        }
    }
}

impl TextStyle {
    pub fn with_color(mut self, color: Rgba8) -> Self {
        self.color = color;
        self
    }

    pub fn with_outline(mut self, outline: Rgba8) -> Self {
        self.outline = Some(outline);
        self
    }

    pub fn with_size(mut self, size_px: f32) -> Self {
        self.size_px = size_px;
        self
    }
}

/// Renders a string into a transparent container of fixed size.
pub trait TextRenderer: Send + Sync {
    fn render_string(
        &self,
        text: &str,
        style: &TextStyle,
        container: Canvas,
        anchor: Anchor,
        padding: Padding,
    ) -> DotboardResult<FrameBuffer>;
}

/// [`TextRenderer`] that lays text out as SVG and rasterizes it with `resvg`.
#[derive(Clone)]
pub struct SvgTextRenderer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl SvgTextRenderer {
    /// Load the system fonts.
    pub fn new() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        Self {
            fontdb: Arc::new(db),
        }
    }

    pub fn with_fontdb(fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self { fontdb }
    }

    pub fn face_count(&self) -> usize {
        self.fontdb.len()
    }
}

impl Default for SvgTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SvgTextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgTextRenderer")
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl TextRenderer for SvgTextRenderer {
    fn render_string(
        &self,
        text: &str,
        style: &TextStyle,
        container: Canvas,
        anchor: Anchor,
        padding: Padding,
    ) -> DotboardResult<FrameBuffer> {
        if container.width == 0 || container.height == 0 {
            return Err(DotboardError::validation("text container must be non-empty"));
        }
        let svg = text_svg(text, style, container, anchor, padding);
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts).context("parse text svg")?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(container.width, container.height)
            .ok_or_else(|| DotboardError::validation("failed to allocate text pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        let mut data = Vec::with_capacity(container.byte_len());
        for px in pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        FrameBuffer::new(container.width, container.height, data)
    }
}

/// One `<text>` element placed by `anchor` inside the padded container.
pub(crate) fn text_svg(
    text: &str,
    style: &TextStyle,
    container: Canvas,
    anchor: Anchor,
    padding: Padding,
) -> String {
    use crate::foundation::core::Align;

    let (w, h) = (i64::from(container.width), i64::from(container.height));
    let [top, right, bottom, left] = <[u32; 4]>::from(padding).map(i64::from);
    let (x, text_anchor) = match anchor.horizontal() {
        Align::Start => (left, "start"),
        Align::Middle => ((w + left - right) / 2, "middle"),
        Align::End => (w - right, "end"),
    };
    let (y, baseline) = match anchor.vertical() {
        Align::Start => (top, "hanging"),
        Align::Middle => ((h + top - bottom) / 2, "central"),
        Align::End => (h - bottom, "text-after-edge"),
    };

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = write!(
        svg,
        r#"<text x="{x}" y="{y}" text-anchor="{text_anchor}" dominant-baseline="{baseline}" font-family="{family}" font-size="{size}" text-rendering="optimizeSpeed" fill="{fill}" fill-opacity="{fill_opacity}""#,
        family = escape_xml(&style.family),
        size = style.size_px,
        fill = css_rgb(style.color),
        fill_opacity = f64::from(style.color.a) / 255.0,
    );
    if let Some(outline) = style.outline {
        let _ = write!(
            svg,
            r#" stroke="{}" stroke-opacity="{}" stroke-width="2" stroke-linejoin="round" paint-order="stroke""#,
            css_rgb(outline),
            f64::from(outline.a) / 255.0
        );
    }
    let _ = write!(svg, ">{}</text></svg>", escape_xml(text));
    svg
}

fn css_rgb(c: Rgba8) -> String {
    format!("rgb({},{},{})", c.r, c.g, c.b)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../tests/unit/text.rs"]
mod tests;
