//! Geometry helpers on [`FrameBuffer`]s: placement, stacking, cropping and opacity.

use crate::foundation::core::{Align, Anchor, Canvas, Padding};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};
use crate::frame::buffer::FrameBuffer;

/// Place `src` on a transparent `canvas` at `anchor`, offset inward by `padding`.
///
/// Content falling outside the canvas is cropped, so the result is always exactly
/// `canvas` sized.
pub fn contain(src: &FrameBuffer, canvas: Canvas, anchor: Anchor, padding: Padding) -> FrameBuffer {
    let (cw, ch) = (i64::from(canvas.width), i64::from(canvas.height));
    let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));

    let x0 = match anchor.horizontal() {
        Align::Start => i64::from(padding.left),
        Align::Middle => (cw - sw) / 2,
        Align::End => cw - sw - i64::from(padding.right),
    };
    let y0 = match anchor.vertical() {
        Align::Start => i64::from(padding.top),
        Align::Middle => (ch - sh) / 2,
        Align::End => ch - sh - i64::from(padding.bottom),
    };

    let mut out = vec![0u8; canvas.byte_len()];
    blit(&mut out, canvas, src, x0, y0);
    FrameBuffer::new(canvas.width, canvas.height, out)
        .unwrap_or_else(|_| FrameBuffer::transparent(canvas.width, canvas.height))
}

/// Copy `src` into `dst` (a `canvas`-sized RGBA8 buffer) with its top-left corner at `(x0, y0)`.
pub(crate) fn blit(dst: &mut [u8], canvas: Canvas, src: &FrameBuffer, x0: i64, y0: i64) {
    let (cw, ch) = (i64::from(canvas.width), i64::from(canvas.height));
    let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));

    let x_begin = x0.max(0);
    let x_end = (x0 + sw).min(cw);
    let y_begin = y0.max(0);
    let y_end = (y0 + sh).min(ch);
    if x_begin >= x_end || y_begin >= y_end {
        return;
    }

    let span = ((x_end - x_begin) * 4) as usize;
    for y in y_begin..y_end {
        let src_row = src.row((y - y0) as u32);
        let s = ((x_begin - x0) * 4) as usize;
        let d = ((y * cw + x_begin) * 4) as usize;
        dst[d..d + span].copy_from_slice(&src_row[s..s + span]);
    }
}

/// Stack buffers of equal width top to bottom.
pub fn vstack(parts: &[FrameBuffer]) -> DotboardResult<FrameBuffer> {
    let Some(first) = parts.first() else {
        return Err(DotboardError::validation("vstack needs at least one buffer"));
    };
    let width = first.width();
    let mut height = 0u32;
    let mut data = Vec::new();
    for part in parts {
        if part.width() != width {
            return Err(DotboardError::validation(format!(
                "vstack width mismatch: {} vs {width}",
                part.width()
            )));
        }
        height += part.height();
        data.extend_from_slice(part.data());
    }
    FrameBuffer::new(width, height, data)
}

/// Join buffers of equal height left to right.
pub fn hstack(parts: &[FrameBuffer]) -> DotboardResult<FrameBuffer> {
    let Some(first) = parts.first() else {
        return Err(DotboardError::validation("hstack needs at least one buffer"));
    };
    let height = first.height();
    if let Some(bad) = parts.iter().find(|p| p.height() != height) {
        return Err(DotboardError::validation(format!(
            "hstack height mismatch: {} vs {height}",
            bad.height()
        )));
    }
    let width: u32 = parts.iter().map(FrameBuffer::width).sum();
    let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
    for y in 0..height {
        for part in parts {
            data.extend_from_slice(part.row(y));
        }
    }
    FrameBuffer::new(width, height, data)
}

/// Keep the top `rows` rows.
pub fn crop_rows(src: &FrameBuffer, rows: u32) -> FrameBuffer {
    if rows >= src.height() {
        return src.clone();
    }
    let end = (rows as usize) * (src.width() as usize) * 4;
    FrameBuffer::new(src.width(), rows, src.data()[..end].to_vec())
        .unwrap_or_else(|_| FrameBuffer::transparent(src.width(), 0))
}

/// Multiply the alpha channel by `opacity` in `[0, 1]`.
pub fn scale_alpha(src: &FrameBuffer, opacity: f64) -> FrameBuffer {
    let op = unit_to_u8(opacity);
    if op == 255 {
        return src.clone();
    }
    let mut data = src.to_vec();
    for px in data.chunks_exact_mut(4) {
        px[3] = mul_div255_u8(u16::from(px[3]), u16::from(op));
    }
    FrameBuffer::new(src.width(), src.height(), data)
        .unwrap_or_else(|_| FrameBuffer::transparent(src.width(), src.height()))
}

/// Convert a decoded image into a `canvas`-sized frame: center-crop to the canvas aspect,
/// then resample.
pub fn fit_cover(img: &image::RgbaImage, canvas: Canvas) -> DotboardResult<FrameBuffer> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(DotboardError::validation("image has zero size"));
    }
    let target = canvas.aspect();
    let (cw, ch) = if f64::from(w) / f64::from(h) > target {
        (((f64::from(h) * target) as u32).clamp(1, w), h)
    } else {
        (w, ((f64::from(w) / target) as u32).clamp(1, h))
    };
    let cropped = image::imageops::crop_imm(img, (w - cw) / 2, (h - ch) / 2, cw, ch).to_image();
    let resized = image::imageops::resize(
        &cropped,
        canvas.width,
        canvas.height,
        image::imageops::FilterType::Triangle,
    );
    FrameBuffer::new(canvas.width, canvas.height, resized.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/frame/ops.rs"]
mod tests;
