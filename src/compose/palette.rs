use std::time::{Duration, Instant};

use crate::compose::blend::ColorRemap;
use crate::foundation::core::Rgb8;
use crate::foundation::math::{hsv_to_rgb, rgb_to_hsv};
use crate::frame::buffer::FrameBuffer;

const SATURATION_BOOST: f64 = 1.2;
const FOREGROUND_VALUE: f64 = 220.0 / 255.0;
const BACKGROUND_VALUE: f64 = 35.0 / 255.0;
const MAX_ITERATIONS: usize = 16;

/// Lighter and darker dominant colours of `frame`, recast as a legible foreground/background pair.
///
/// Pixels with zero alpha are ignored. Returns `None` for a fully transparent frame.
pub fn dominant_colors(frame: &FrameBuffer) -> Option<(Rgb8, Rgb8)> {
    let pixels: Vec<[f64; 3]> = frame
        .data()
        .chunks_exact(4)
        .filter(|px| px[3] > 0)
        .map(|px| boost_saturation([f64::from(px[0]), f64::from(px[1]), f64::from(px[2])]))
        .collect();
    if pixels.is_empty() {
        return None;
    }

    let (light, dark) = two_means(&pixels);
    Some((with_value(light, FOREGROUND_VALUE), with_value(dark, BACKGROUND_VALUE)))
}

fn luma(c: [f64; 3]) -> f64 {
    0.299 * c[0] + 0.587 * c[1] + 0.114 * c[2]
}

fn dist2(a: [f64; 3], b: [f64; 3]) -> f64 {
    (0..3).map(|i| (a[i] - b[i]).powi(2)).sum()
}

fn boost_saturation(rgb: [f64; 3]) -> [f64; 3] {
    let [h, s, v] = rgb_to_hsv(rgb);
    hsv_to_rgb([h, (s * SATURATION_BOOST).min(1.0), v])
}

fn with_value(rgb: [f64; 3], value: f64) -> Rgb8 {
    let [h, s, _] = rgb_to_hsv(rgb);
    let [r, g, b] = hsv_to_rgb([h, s, value]);
    Rgb8::new(
        r.round().clamp(0.0, 255.0) as u8,
        g.round().clamp(0.0, 255.0) as u8,
        b.round().clamp(0.0, 255.0) as u8,
    )
}

/// Two-cluster k-means seeded with the brightest and darkest pixels. Returns (lighter, darker).
fn two_means(pixels: &[[f64; 3]]) -> ([f64; 3], [f64; 3]) {
    let by_luma = |a: &&[f64; 3], b: &&[f64; 3]| luma(**a).total_cmp(&luma(**b));
    let mut centers = [
        *pixels.iter().max_by(by_luma).unwrap_or(&pixels[0]),
        *pixels.iter().min_by(by_luma).unwrap_or(&pixels[0]),
    ];

    for _ in 0..MAX_ITERATIONS {
        let mut sums = [[0.0f64; 3]; 2];
        let mut counts = [0usize; 2];
        for &px in pixels {
            let k = usize::from(dist2(px, centers[1]) < dist2(px, centers[0]));
            counts[k] += 1;
            for c in 0..3 {
                sums[k][c] += px[c];
            }
        }
        let mut next = centers;
        for k in 0..2 {
            if counts[k] > 0 {
                let n = counts[k] as f64;
                next[k] = [sums[k][0] / n, sums[k][1] / n, sums[k][2] / n];
            }
        }
        if next == centers {
            break;
        }
        centers = next;
    }

    if luma(centers[0]) >= luma(centers[1]) {
        (centers[0], centers[1])
    } else {
        (centers[1], centers[0])
    }
}

/// Exponentially smoothed foreground/background pair, resampled at a capped rate.
#[derive(Clone, Debug)]
pub struct ColorSampler {
    smoothing: f64,
    interval: Duration,
    last_sample: Option<Instant>,
    foreground: [f64; 3],
    background: [f64; 3],
}

impl ColorSampler {
    pub const DEFAULT_SMOOTHING: f64 = 0.15;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

    pub fn new() -> Self {
        Self::with_params(Self::DEFAULT_SMOOTHING, Self::DEFAULT_INTERVAL)
    }

    pub fn with_params(smoothing: f64, interval: Duration) -> Self {
        Self {
            smoothing: smoothing.clamp(0.0, 1.0),
            interval,
            last_sample: None,
            foreground: [255.0; 3],
            background: [0.0; 3],
        }
    }

    pub fn remap(&self) -> ColorRemap {
        let q = |c: [f64; 3]| Rgb8::new(c[0].round() as u8, c[1].round() as u8, c[2].round() as u8);
        ColorRemap {
            foreground: q(self.foreground),
            background: q(self.background),
        }
    }

    /// Fold `frame` into the running average unless the last sample is more recent than the
    /// sampling interval. The first sample is taken as is.
    pub fn update(&mut self, frame: &FrameBuffer, now: Instant) -> ColorRemap {
        if let Some(last) = self.last_sample
            && now.saturating_duration_since(last) < self.interval
        {
            return self.remap();
        }
        let Some((fg, bg)) = dominant_colors(frame) else {
            return self.remap();
        };
        let fg = fg.to_array().map(f64::from);
        let bg = bg.to_array().map(f64::from);
        let a = if self.last_sample.is_none() {
            1.0
        } else {
            self.smoothing
        };
        for c in 0..3 {
            self.foreground[c] += a * (fg[c] - self.foreground[c]);
            self.background[c] += a * (bg[c] - self.background[c]);
        }
        self.last_sample = Some(now);
        self.remap()
    }

    pub fn reset(&mut self) {
        *self = Self::with_params(self.smoothing, self.interval);
    }
}

impl Default for ColorSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/palette.rs"]
mod tests;
