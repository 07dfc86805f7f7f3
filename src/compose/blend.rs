use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::frame::buffer::FrameBuffer;

/// Glyph pixels drawn in this colour take the sampled foreground colour.
pub const FOREGROUND_MARKER: Rgb8 = Rgb8::new(254, 254, 254);
/// Glyph pixels drawn in this colour take the sampled background colour.
pub const BACKGROUND_MARKER: Rgb8 = Rgb8::new(1, 1, 1);

/// Replacement colours for the two marker colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorRemap {
    pub foreground: Rgb8,
    pub background: Rgb8,
}

impl ColorRemap {
    pub fn apply(&self, rgb: [u8; 3]) -> [u8; 3] {
        if rgb == FOREGROUND_MARKER.to_array() {
            self.foreground.to_array()
        } else if rgb == BACKGROUND_MARKER.to_array() {
            self.background.to_array()
        } else {
            rgb
        }
    }
}

/// Straight-alpha "over": `under * (1 - a) + src * a`, rounded once.
pub fn over(under: [u8; 3], src: [u8; 3], alpha: u8) -> [u8; 3] {
    let a = u32::from(alpha);
    let inv = 255 - a;
    let mut out = [0u8; 3];
    for i in 0..3 {
        out[i] = ((u32::from(under[i]) * inv + u32::from(src[i]) * a + 127) / 255) as u8;
    }
    out
}

/// Blend `layers` bottom to top over a canvas filled with `fill`.
///
/// The result is opaque. When `remap` is set, marker pixels in every layer above the first are
/// recoloured before blending.
pub fn alpha_blend(
    layers: &[FrameBuffer],
    canvas: Canvas,
    fill: Rgb8,
    remap: Option<ColorRemap>,
) -> DotboardResult<FrameBuffer> {
    let px_count = (canvas.width as usize) * (canvas.height as usize);
    let mut rgb = fill.to_array().repeat(px_count);

    for (depth, layer) in layers.iter().enumerate() {
        if layer.canvas() != canvas {
            return Err(DotboardError::validation(format!(
                "layer {depth} is {}x{}, canvas is {}x{}",
                layer.width(),
                layer.height(),
                canvas.width,
                canvas.height
            )));
        }
        let remap = if depth == 0 { None } else { remap };
        for (dst, src) in rgb.chunks_exact_mut(3).zip(layer.data().chunks_exact(4)) {
            let alpha = src[3];
            if alpha == 0 {
                continue;
            }
            let mut color = [src[0], src[1], src[2]];
            if let Some(remap) = remap {
                color = remap.apply(color);
            }
            let under = [dst[0], dst[1], dst[2]];
            dst.copy_from_slice(&over(under, color, alpha));
        }
    }

    let mut out = Vec::with_capacity(px_count * 4);
    for px in rgb.chunks_exact(3) {
        out.extend_from_slice(px);
        out.push(255);
    }
    FrameBuffer::new(canvas.width, canvas.height, out)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/blend.rs"]
mod tests;
