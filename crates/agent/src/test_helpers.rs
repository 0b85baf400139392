//! Shared fakes for the pipeline tests.

use celeste_core::error::{ProviderError, WeatherError};
use celeste_core::location::Coordinates;
use celeste_core::message::Message;
use celeste_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use celeste_core::weather::{WeatherReport, WeatherSnapshot, WeatherSource};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted replies.
///
/// Each call to `complete` records the request and returns the next reply.
/// Once the script runs out every call fails with a network error.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Network("script exhausted".into())));

        next.map(|text| ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }
}

/// A weather source that records every query and answers with a fixed result.
pub struct RecordingWeather {
    result: Result<WeatherReport, WeatherError>,
    queries: Mutex<Vec<String>>,
}

impl RecordingWeather {
    pub fn reporting(description: &str, cloud_cover_percent: u8) -> Self {
        Self::with_result(Ok(WeatherReport {
            coordinates: Coordinates::new(35.69, 139.69),
            snapshot: WeatherSnapshot {
                description: description.into(),
                cloud_cover_percent,
                visibility_km: Some(10.0),
                temperature_celsius: 14.0,
            },
        }))
    }

    pub fn failing(error: WeatherError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(result: Result<WeatherReport, WeatherError>) -> Self {
        Self {
            result,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl WeatherSource for RecordingWeather {
    fn name(&self) -> &str {
        "recording_mock"
    }

    async fn fetch(&self, query: &str) -> Result<WeatherReport, WeatherError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.result.clone()
    }
}
