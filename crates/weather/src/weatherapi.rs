//! WeatherAPI.com client.
//!
//! `GET {base}/forecast.json?key=…&q=…&days=1&aqi=no&alerts=no`. The query is
//! a place name or a `"lat,lon"` pair. Only `location.lat/lon` and four
//! `current` fields are consumed; `vis_km` is optional, the rest are required.

use async_trait::async_trait;
use celeste_core::error::WeatherError;
use celeste_core::location::Coordinates;
use celeste_core::weather::{WeatherReport, WeatherSnapshot, WeatherSource};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: Option<String>,
    base_url: String,
    forecast_days: u8,
    timeout: Duration,
    http: reqwest::Client,
}

impl WeatherApiClient {
    /// A client with no key is valid; every lookup is then a no-op.
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::NotConfigured(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: "http://api.weatherapi.com/v1".into(),
            forecast_days: 1,
            timeout,
            http,
        })
    }

    pub fn from_config(config: &celeste_config::AppConfig) -> Result<Self, WeatherError> {
        let mut client = Self::new(
            config.weather.api_key.clone(),
            Duration::from_secs(config.timeouts.weather_secs),
        )?
        .with_base_url(&config.weather.base_url);
        client.forecast_days = config.weather.forecast_days.max(1);
        Ok(client)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    fn name(&self) -> &str {
        "weatherapi"
    }

    async fn fetch(&self, query: &str) -> Result<WeatherReport, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| WeatherError::NotConfigured("WEATHERAPI_KEY not set".into()))?;

        let url = format!("{}/forecast.json", self.base_url);
        let days = self.forecast_days.to_string();

        debug!(location = %query, "Requesting current conditions");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("key", api_key),
                ("q", query),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WeatherError::Timeout {
                        timeout_secs: self.timeout.as_secs(),
                    }
                } else {
                    WeatherError::Network(e.to_string())
                }
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::Network(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(WeatherError::ApiError {
                status_code: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        parse_forecast(&body)
    }
}

/// Extract coordinates and current conditions from a `forecast.json` body.
pub fn parse_forecast(body: &str) -> Result<WeatherReport, WeatherError> {
    let parsed: WaResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::Malformed(e.to_string()))?;

    Ok(WeatherReport {
        coordinates: Coordinates::new(parsed.location.lat, parsed.location.lon),
        snapshot: WeatherSnapshot {
            description: parsed.current.condition.text,
            cloud_cover_percent: parsed.current.cloud,
            visibility_km: parsed.current.vis_km,
            temperature_celsius: parsed.current.temp_c,
        },
    })
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    cloud: u8,
    #[serde(default)]
    vis_km: Option<f64>,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
