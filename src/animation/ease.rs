/// Easing functions used to map normalized animation progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Cubic ease-in.
    #[serde(alias = "ease_in")]
    InCubic,
    /// Quartic ease-in; drops off faster than [`Ease::InCubic`] near zero.
    #[serde(alias = "ease_in_fast")]
    InQuart,
    /// Cubic ease-out.
    #[serde(alias = "ease_out")]
    OutCubic,
    /// Cubic ease-in/out.
    #[serde(alias = "ease_in_out")]
    InOutCubic,
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::InCubic => t * t * t,
            Self::InQuart => t.powi(4),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            // Continuous at 0.5; both halves reach exactly 0.5 there.
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
