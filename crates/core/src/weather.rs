//! Weather source trait and the current-conditions snapshot.

use crate::error::WeatherError;
use crate::location::Coordinates;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Shown when the provider did not report visibility.
pub const VISIBILITY_UNAVAILABLE: &str = "N/A";

/// Current conditions at the effective location. Request-scoped, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub description: String,
    pub cloud_cover_percent: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility_km: Option<f64>,
    pub temperature_celsius: f64,
}

impl WeatherSnapshot {
    pub fn visibility_label(&self) -> String {
        self.visibility_km
            .map(|v| v.to_string())
            .unwrap_or_else(|| VISIBILITY_UNAVAILABLE.to_string())
    }
}

/// A successful lookup: where the provider resolved the query, and what it is like there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub coordinates: Coordinates,
    pub snapshot: WeatherSnapshot,
}

/// A current-conditions lookup by place name or `"lat,lon"` pair.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// A human-readable name for this source (e.g., "weatherapi").
    fn name(&self) -> &str;

    /// Fetch current conditions for `query`.
    async fn fetch(&self, query: &str) -> Result<WeatherReport, WeatherError>;

    /// Fetch, degrading every failure to `(None, None)`.
    async fn lookup(&self, query: &str) -> (Option<Coordinates>, Option<WeatherSnapshot>) {
        match self.fetch(query).await {
            Ok(report) => (Some(report.coordinates), Some(report.snapshot)),
            Err(e) if e.is_skip() => {
                debug!(source = %self.name(), reason = %e, "Weather lookup skipped");
                (None, None)
            }
            Err(e) => {
                warn!(source = %self.name(), error = %e, "Weather lookup failed");
                (None, None)
            }
        }
    }
}
