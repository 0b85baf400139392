//! Error types for the Celeste domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each external collaborator has its own error enum so callers can decide
//! which failures degrade and which are worth surfacing.

use thiserror::Error;

/// The top-level error type for Celeste operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Weather errors ---
    #[error("Weather error: {0}")]
    Weather(#[from] WeatherError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Collaborator errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned no text: {0}")]
    EmptyResponse(String),
}

#[derive(Debug, Clone, Error)]
pub enum WeatherError {
    #[error("Empty location query")]
    EmptyQuery,

    #[error("Weather provider not configured: {0}")]
    NotConfigured(String),

    #[error("Weather request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Weather API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Malformed weather response: {0}")]
    Malformed(String),
}

impl WeatherError {
    /// Whether this error is a planned no-op (nothing was sent on the wire).
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::EmptyQuery | Self::NotConfigured(_))
    }
}
