use std::time::{Duration, Instant};

use crate::animation::ease::Ease;
use crate::foundation::clock::secs_since;

/// Opacity ramp from 0 to 1 over `enter` after `since`, eased out.
pub fn fade_in(now: Instant, since: Instant, enter: Duration) -> f64 {
    let elapsed = secs_since(now, since);
    let d = enter.as_secs_f64();
    if d <= 0.0 || elapsed >= d {
        return 1.0;
    }
    Ease::OutCubic.apply(elapsed / d)
}

/// Sampled state of a [`SlideFade`] transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionSample {
    /// Fraction of the entry's rows that stay visible.
    pub height: f64,
    pub opacity: f64,
}

impl TransitionSample {
    pub const IDLE: TransitionSample = TransitionSample {
        height: 1.0,
        opacity: 1.0,
    };
}

/// Enter/exit transition for entries with a fixed lifetime.
///
/// Entering fades in (ease-out) at full height. Exiting collapses height with an ease-in curve
/// and fades with a steeper one, so the entry is mostly invisible before it starts shrinking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlideFade {
    pub enter: Duration,
    pub exit: Duration,
}

impl Default for SlideFade {
    fn default() -> Self {
        Self {
            enter: Duration::from_millis(400),
            exit: Duration::from_millis(400),
        }
    }
}

impl SlideFade {
    pub fn sample(&self, now: Instant, created: Instant, expires: Instant) -> TransitionSample {
        let since_created = secs_since(now, created);
        let until_expiry = secs_since(expires, now);
        let enter = self.enter.as_secs_f64();
        let exit = self.exit.as_secs_f64();

        if enter > 0.0 && since_created < enter {
            TransitionSample {
                height: 1.0,
                opacity: Ease::OutCubic.apply(since_created / enter),
            }
        } else if exit > 0.0 && until_expiry < exit {
            let t = until_expiry / exit;
            TransitionSample {
                height: Ease::InCubic.apply(t),
                opacity: Ease::InQuart.apply(t),
            }
        } else {
            TransitionSample::IDLE
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/transition.rs"]
mod tests;
