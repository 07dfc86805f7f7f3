use std::time::Duration;

use crate::foundation::error::{DotboardError, DotboardResult};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> DotboardResult<Self> {
        if den == 0 {
            return Err(DotboardError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(DotboardError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Approximate a floating-point rate (e.g. `29.97`) with millisecond precision.
    pub fn from_f64(fps: f64) -> DotboardResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(DotboardError::validation(format!("invalid fps {fps}")));
        }
        let num = (fps * 1000.0).round();
        if num > f64::from(u32::MAX) {
            return Err(DotboardError::validation(format!("fps {fps} out of range")));
        }
        Self::new(num as u32, 1000).map(Self::reduced)
    }

    fn reduced(self) -> Self {
        fn gcd(a: u32, b: u32) -> u32 {
            if b == 0 { a } else { gcd(b, a % b) }
        }
        let g = gcd(self.num, self.den).max(1);
        Self {
            num: self.num / g,
            den: self.den / g,
        }
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Whole frames elapsed in `elapsed`, computed exactly in nanoseconds.
    pub fn frames_in(self, elapsed: Duration) -> u64 {
        let n = elapsed.as_nanos() * u128::from(self.num);
        let d = u128::from(self.den) * NANOS_PER_SEC;
        u64::try_from(n / d).unwrap_or(u64::MAX)
    }

    /// Earliest offset at which `frames_in` reaches `index`.
    pub fn frame_start(self, index: u64) -> Duration {
        let n = u128::from(index) * u128::from(self.den) * NANOS_PER_SEC;
        let d = u128::from(self.num);
        let nanos = n.div_ceil(d);
        Duration::new(
            u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX),
            (nanos % NANOS_PER_SEC) as u32,
        )
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// The nominal panel size.
    pub const MATRIX: Canvas = Canvas {
        width: 96,
        height: 48,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }

    /// Bytes in one RGBA8 frame of this size.
    pub fn byte_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::MATRIX
    }
}

impl From<[u32; 2]> for Canvas {
    fn from([width, height]: [u32; 2]) -> Self {
        Self { width, height }
    }
}

impl From<Canvas> for [u32; 2] {
    fn from(c: Canvas) -> Self {
        [c.width, c.height]
    }
}

/// Opaque RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Rgb8 = Rgb8::new(0, 0, 0);
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb8> for [u8; 3] {
    fn from(c: Rgb8) -> Self {
        c.to_array()
    }
}

/// Straight-alpha RGBA colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba8> for [u8; 4] {
    fn from(c: Rgba8) -> Self {
        c.to_array()
    }
}

/// Where a smaller buffer sits inside a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum Anchor {
    #[default]
    #[serde(rename = "tl")]
    TopLeft,
    #[serde(rename = "tm")]
    TopMiddle,
    #[serde(rename = "tr")]
    TopRight,
    #[serde(rename = "ml")]
    MiddleLeft,
    #[serde(rename = "mm")]
    Center,
    #[serde(rename = "mr")]
    MiddleRight,
    #[serde(rename = "bl")]
    BottomLeft,
    #[serde(rename = "bm")]
    BottomMiddle,
    #[serde(rename = "br")]
    BottomRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Align {
    Start,
    Middle,
    End,
}

impl Anchor {
    pub(crate) fn vertical(self) -> Align {
        match self {
            Self::TopLeft | Self::TopMiddle | Self::TopRight => Align::Start,
            Self::MiddleLeft | Self::Center | Self::MiddleRight => Align::Middle,
            Self::BottomLeft | Self::BottomMiddle | Self::BottomRight => Align::End,
        }
    }

    pub(crate) fn horizontal(self) -> Align {
        match self {
            Self::TopLeft | Self::MiddleLeft | Self::BottomLeft => Align::Start,
            Self::TopMiddle | Self::Center | Self::BottomMiddle => Align::Middle,
            Self::TopRight | Self::MiddleRight | Self::BottomRight => Align::End,
        }
    }
}

/// Padding in pixels, in CSS order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct Padding {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Padding {
    pub const ZERO: Padding = Padding::new(0, 0, 0, 0);

    pub const fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl From<[u32; 4]> for Padding {
    fn from([top, right, bottom, left]: [u32; 4]) -> Self {
        Self::new(top, right, bottom, left)
    }
}

impl From<Padding> for [u32; 4] {
    fn from(p: Padding) -> Self {
        [p.top, p.right, p.bottom, p.left]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
