//! The display loop: pull a frame, present it, watch the config file.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Config, ConfigWatcher};
use crate::foundation::clock::Clock;
use crate::foundation::error::DotboardResult;
use crate::renderer::Renderer;
use crate::sink::DisplaySink;

/// Frame intervals averaged into the reported frame rate.
pub const FPS_WINDOW: usize = 10;
/// How often the frame rate is logged at `info` level.
pub const FPS_REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// When to stop the loop and how fast it may go.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunLimits {
    /// Upper bound on ticks per second; `None` runs as fast as frames can be produced.
    pub max_fps: Option<u32>,
    /// Stop after this many frames.
    pub frames: Option<u64>,
    /// Stop once this much clock time has passed.
    pub duration: Option<Duration>,
}

pub struct Controller {
    config: Config,
    renderer: Renderer,
    sink: Box<dyn DisplaySink>,
    watcher: Option<ConfigWatcher>,
    clock: Arc<dyn Clock>,
    frame_times: VecDeque<Duration>,
    last_tick: Option<Instant>,
    last_report: Option<Instant>,
    presented: u64,
}

impl Controller {
    pub fn new(
        config: Config,
        renderer: Renderer,
        sink: Box<dyn DisplaySink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            renderer,
            sink,
            watcher: None,
            clock,
            frame_times: VecDeque::with_capacity(FPS_WINDOW),
            last_tick: None,
            last_report: None,
            presented: 0,
        }
    }

    /// Reload the producer set whenever `watcher` reports a changed file.
    pub fn with_watcher(mut self, watcher: ConfigWatcher) -> Self {
        self.watcher = Some(watcher);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Mean frame rate over the last [`FPS_WINDOW`] intervals.
    pub fn fps(&self) -> Option<f64> {
        if self.frame_times.is_empty() {
            return None;
        }
        let total: Duration = self.frame_times.iter().sum();
        if total.is_zero() {
            return None;
        }
        Some(self.frame_times.len() as f64 / total.as_secs_f64())
    }

    /// Swap to `config` now.
    pub fn apply(&mut self, config: Config) -> DotboardResult<()> {
        self.renderer.apply_config(&config)?;
        self.config = config;
        Ok(())
    }

    /// One display cycle.
    pub fn tick(&mut self) -> DotboardResult<()> {
        let now = self.clock.now();
        if let Some(config) = self.watcher.as_mut().and_then(|w| w.poll(now)) {
            if let Err(e) = self.apply(config) {
                tracing::warn!(error = %e, "config rejected, keeping current apps");
            }
        }

        let frame = self.renderer.get_frame()?;
        self.sink.present(&frame)?;
        self.presented += 1;
        self.record(self.clock.now());
        Ok(())
    }

    /// Tick until a limit is reached, then flush the sink.
    pub fn run(&mut self, limits: RunLimits) -> DotboardResult<()> {
        let min_period = limits
            .max_fps
            .filter(|&n| n > 0)
            .map(|n| Duration::from_secs(1) / n);
        let started = self.clock.now();
        loop {
            if limits.frames.is_some_and(|n| self.presented >= n) {
                break;
            }
            if limits
                .duration
                .is_some_and(|d| self.clock.now().saturating_duration_since(started) >= d)
            {
                break;
            }
            let tick_start = self.clock.now();
            self.tick()?;
            if let Some(period) = min_period {
                let spent = self.clock.now().saturating_duration_since(tick_start);
                if spent < period {
                    self.clock.sleep(period - spent);
                }
            }
        }
        self.sink.finish()
    }

    /// Stop producers and wait for them to exit.
    pub fn shutdown(mut self) {
        self.renderer.shutdown();
    }

    fn record(&mut self, now: Instant) {
        if let Some(prev) = self.last_tick.replace(now) {
            if self.frame_times.len() == FPS_WINDOW {
                self.frame_times.pop_front();
            }
            self.frame_times.push_back(now.saturating_duration_since(prev));
        }
        let Some(fps) = self.fps() else {
            return;
        };
        tracing::debug!(fps = format_args!("{fps:.1}"), "frame presented");
        let due = self
            .last_report
            .is_none_or(|t| now.saturating_duration_since(t) >= FPS_REPORT_INTERVAL);
        if due {
            self.last_report = Some(now);
            tracing::info!(fps = format_args!("{fps:.1}"), frames = self.presented, "display rate");
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/controller.rs"]
mod tests;
