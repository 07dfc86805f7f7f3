//! Owns the compositor and the running producer set.

use std::sync::Arc;

use crate::app::{AppHandle, AppKind, create_app};
use crate::compose::compositor::Compositor;
use crate::config::Config;
use crate::foundation::clock::Clock;
use crate::foundation::error::DotboardResult;
use crate::frame::buffer::FrameBuffer;
use crate::text::TextRenderer;

pub struct Renderer {
    compositor: Compositor,
    apps: Vec<AppHandle>,
    text: Arc<dyn TextRenderer>,
}

impl Renderer {
    /// Build a renderer for `config` and start its producers.
    pub fn new(
        config: &Config,
        clock: Arc<dyn Clock>,
        text: Arc<dyn TextRenderer>,
    ) -> DotboardResult<Self> {
        let compositor = Compositor::new(config.compositor_settings(), clock)?;
        let mut renderer = Self {
            compositor,
            apps: Vec::new(),
            text,
        };
        renderer.start_apps(config);
        Ok(renderer)
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn running(&self) -> Vec<AppKind> {
        self.apps.iter().map(AppHandle::kind).collect()
    }

    /// Replace the producer set with the one `config` describes.
    ///
    /// Old producers are signalled and their mailboxes closed before any new producer starts,
    /// so nothing they publish afterwards reaches a layer. Rejected settings leave the running
    /// set untouched.
    #[tracing::instrument(skip_all, fields(apps = config.apps.len()))]
    pub fn apply_config(&mut self, config: &Config) -> DotboardResult<()> {
        // Nothing is torn down until the new settings are known to be usable.
        let settings = config.compositor_settings();
        settings.validate()?;
        let rebuilt = if settings.canvas != self.compositor.canvas() {
            let clock = self.compositor.clock().clone();
            Some(Compositor::new(settings.clone(), clock)?)
        } else {
            None
        };

        self.stop_apps();
        self.compositor.disconnect_all();
        match rebuilt {
            Some(compositor) => self.compositor = compositor,
            None => self
                .compositor
                .reconfigure(settings.fill, settings.color_remap, settings.order)?,
        }

        self.start_apps(config);
        tracing::info!(running = self.apps.len(), "producers swapped");
        Ok(())
    }

    pub fn get_frame(&mut self) -> DotboardResult<FrameBuffer> {
        self.compositor.get_frame()
    }

    /// Stop every producer and wait for the threads to exit.
    pub fn shutdown(&mut self) {
        for app in &self.apps {
            app.stop();
        }
        self.compositor.disconnect_all();
        for app in self.apps.drain(..) {
            app.join();
        }
    }

    fn stop_apps(&mut self) {
        for app in &self.apps {
            app.stop();
        }
        // Handles are dropped without joining: a producer stuck in I/O exits on its own.
        self.apps.clear();
    }

    fn start_apps(&mut self, config: &Config) {
        for (kind, options) in config.resolved_apps() {
            let started = create_app(kind, options)
                .and_then(|app| app.start(kind, &mut self.compositor, self.text.clone()));
            match started {
                Ok(handle) => self.apps.push(handle),
                Err(e) => tracing::warn!(app = %kind, error = %e, "app not started"),
            }
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.stop_apps();
    }
}

#[cfg(test)]
#[path = "../tests/unit/renderer.rs"]
mod tests;
