//! The JSON configuration file and its hot-reload watcher.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use anyhow::Context as _;

use crate::app::AppKind;
use crate::compose::compositor::CompositorSettings;
use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::layer::LayerKind;

/// One `apps` entry as written in the file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawAppConfig {
    pub name: String,
    #[serde(default)]
    pub options: serde_json::Value,
}

impl RawAppConfig {
    pub fn new(name: impl Into<String>, options: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub dimensions: Canvas,
    /// Fill colour under every layer.
    pub background: Rgb8,
    pub color_remap: bool,
    /// Depth order, bottom first.
    pub layers: Vec<LayerKind>,
    pub apps: Vec<RawAppConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dimensions: Canvas::MATRIX,
            background: Rgb8::BLACK,
            color_remap: true,
            layers: LayerKind::DEFAULT_ORDER.to_vec(),
            apps: vec![RawAppConfig::new("setup", serde_json::Value::Null)],
        }
    }
}

impl Config {
    pub const DEFAULT_PATH: &'static str = "config.json";

    /// Read and validate `path`.
    pub fn try_load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("parse config '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::try_load`] but never fails: a missing or invalid file yields defaults.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "no config file found, using defaults");
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %format!("{e:#}"),
                    "config file is invalid, using defaults"
                );
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> DotboardResult<()> {
        if self.dimensions.width == 0 || self.dimensions.height == 0 {
            return Err(DotboardError::validation("dimensions must be non-zero"));
        }
        self.compositor_settings().validate()
    }

    pub fn compositor_settings(&self) -> CompositorSettings {
        CompositorSettings {
            canvas: self.dimensions,
            fill: self.background,
            color_remap: self.color_remap,
            order: self.layers.clone(),
        }
    }

    /// Known app entries in file order. Unknown names are logged and skipped.
    pub fn resolved_apps(&self) -> Vec<(AppKind, serde_json::Value)> {
        self.apps
            .iter()
            .filter_map(|app| match AppKind::from_name(&app.name) {
                Some(kind) => Some((kind, app.options.clone())),
                None => {
                    tracing::warn!(name = %app.name, "unknown app, skipping");
                    None
                }
            })
            .collect()
    }
}

/// Polls a config file's modification time at a fixed interval.
#[derive(Debug)]
pub struct ConfigWatcher {
    path: PathBuf,
    interval: Duration,
    last_check: Option<Instant>,
    last_modified: Option<SystemTime>,
}

impl ConfigWatcher {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let last_modified = modified(&path);
        Self {
            path,
            interval: Self::DEFAULT_INTERVAL,
            last_check: None,
            last_modified,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The reloaded config if the file changed since the last poll.
    pub fn poll(&mut self, now: Instant) -> Option<Config> {
        if let Some(last) = self.last_check
            && now.saturating_duration_since(last) < self.interval
        {
            return None;
        }
        self.last_check = Some(now);
        let current = modified(&self.path);
        if current == self.last_modified {
            return None;
        }
        self.last_modified = current;
        tracing::info!(path = %self.path.display(), "config changed, reloading");
        Some(Config::load(&self.path))
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
