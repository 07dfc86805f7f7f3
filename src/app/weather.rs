use std::time::Duration;

use crate::app::{Next, Producer, ProducerContext, glyph_style};
use crate::foundation::core::{Anchor, Canvas, Padding};
use crate::foundation::error::{DotboardError, DotboardResult};
use crate::layer::WidgetUpdate;

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct WeatherOptions {
    pub api_key: String,
    pub lat: f64,
    pub lon: f64,
    /// PirateWeather unit system: `us`, `si`, `ca` or `uk`.
    pub units: String,
    pub interval_secs: u64,
    pub endpoint: String,
    pub priority: i32,
}

impl Default for WeatherOptions {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            lat: 0.0,
            lon: 0.0,
            units: "us".to_owned(),
            interval_secs: 5 * 60,
            endpoint: "https://api.pirateweather.net/forecast".to_owned(),
            priority: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Currently {
    #[serde(default)]
    pub icon: String,
    pub temperature: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Forecast {
    pub currently: Currently,
}

/// Widget "weather": current conditions from PirateWeather.
pub struct WeatherApp {
    opts: WeatherOptions,
    client: Option<reqwest::blocking::Client>,
}

impl WeatherApp {
    pub const CONTAINER: Canvas = Canvas {
        width: 30,
        height: 8,
    };

    pub fn new(opts: WeatherOptions) -> DotboardResult<Self> {
        if opts.api_key.trim().is_empty() {
            return Err(DotboardError::validation("weather needs an api_key"));
        }
        Ok(Self { opts, client: None })
    }

    pub fn url(&self) -> String {
        format!(
            "{}/{}/{},{}?units={}",
            self.opts.endpoint.trim_end_matches('/'),
            self.opts.api_key,
            self.opts.lat,
            self.opts.lon,
            self.opts.units
        )
    }

    fn fetch(&mut self) -> DotboardResult<Forecast> {
        if self.client.is_none() {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .map_err(|e| DotboardError::source(format!("http client: {e}")))?;
            self.client = Some(client);
        }
        let Some(client) = self.client.as_ref() else {
            return Err(DotboardError::source("http client unavailable"));
        };
        let response = client
            .get(self.url())
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| DotboardError::source(format!("weather request failed: {e}")))?;
        response
            .json::<Forecast>()
            .map_err(|e| DotboardError::source(format!("weather response unreadable: {e}")))
    }
}

/// Symbol for a PirateWeather icon code.
pub fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "clear-day" => "☀",
        "clear-night" => "☾",
        "rain" => "☂",
        "snow" | "sleet" => "❄",
        "wind" => "≈",
        "fog" => "≡",
        "cloudy" | "partly-cloudy-night" => "☁",
        "partly-cloudy-day" => "⛅",
        _ => "?",
    }
}

pub fn weather_label(forecast: &Forecast) -> String {
    let temp = forecast.currently.temperature.round() as i64;
    format!("{} {temp}°", icon_glyph(&forecast.currently.icon))
}

impl Producer<WidgetUpdate> for WeatherApp {
    fn step(&mut self, ctx: &ProducerContext<WidgetUpdate>) -> DotboardResult<Next> {
        let forecast = self.fetch()?;
        let label = weather_label(&forecast);
        tracing::debug!(%label, "weather updated");
        let render = ctx.text().render_string(
            &label,
            &glyph_style(),
            Self::CONTAINER,
            Anchor::TopRight,
            Padding::new(0, 0, 1, 0),
        )?;
        ctx.publish(WidgetUpdate::new("weather", render, self.opts.priority))?;
        Ok(Next::After(Duration::from_secs(self.opts.interval_secs.max(1))))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/weather.rs"]
mod tests;
