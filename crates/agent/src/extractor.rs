//! Location extraction: one low-temperature classification call per query.

use celeste_core::error::ProviderError;
use celeste_core::location::{CURRENT_LOCATION_MARKER, LocationResolution, NO_LOCATION_MARKER};
use celeste_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use tracing::{debug, warn};

/// Asks the model which place, if any, a query is about.
pub struct LocationExtractor {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
}

impl LocationExtractor {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// The classification prompt for `query`.
    pub fn prompt(query: &str) -> String {
        format!(
            "From the following user query, extract only the city and country name if present.\n\
             If a specific location is mentioned, return it.\n\
             If the query asks about \"my current location\", return \"{CURRENT_LOCATION_MARKER}\".\n\
             If no location is mentioned, return \"{NO_LOCATION_MARKER}\".\n\
             Query: \"{query}\"\n\
             Location:"
        )
    }

    /// Classify `query`, surfacing provider failures.
    pub async fn try_extract(&self, query: &str) -> Result<LocationResolution, ProviderError> {
        let request =
            ProviderRequest::single(&self.model, Self::prompt(query)).with_temperature(self.temperature);
        let response = self.provider.complete(request).await?;
        let resolution = LocationResolution::from_model_reply(&response.message.content);

        debug!(reply = %response.message.content.trim(), ?resolution, "Location extracted");
        Ok(resolution)
    }

    /// Classify `query`; any failure counts as no location mentioned.
    pub async fn extract(&self, query: &str) -> LocationResolution {
        match self.try_extract(query).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(provider = %self.provider.name(), error = %e, "Location extraction failed");
                LocationResolution::None
            }
        }
    }
}
