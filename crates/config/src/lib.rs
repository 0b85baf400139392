//! Configuration loading, validation, and management for Celeste.
//!
//! Loads configuration from `~/.celeste/config.toml` with environment
//! variable overrides. Validates all settings at startup. The resulting
//! `AppConfig` is built once and handed to each adapter's constructor.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.celeste/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language-model API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Temperature for persona replies
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Max tokens per persona reply
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Temperature for the location classification call
    #[serde(default)]
    pub extraction_temperature: f32,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Persona configuration
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Outbound call timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("extraction_temperature", &self.extraction_temperature)
            .field("providers", &self.providers)
            .field("weather", &self.weather)
            .field("gateway", &self.gateway)
            .field("persona", &self.persona)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("forecast_days", &self.forecast_days)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// WeatherAPI.com key. Absent = every lookup is a no-op.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,
}

fn default_weather_base_url() -> String {
    "http://api.weatherapi.com/v1".into()
}
fn default_forecast_days() -> u8 {
    1
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            forecast_days: default_forecast_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// The single frontend origin allowed to call the API
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,

    /// Path prefix the API routes (and CORS policy) live under
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_port() -> u16 {
    5001
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origin() -> String {
    "http://localhost:3000".into()
}
fn default_api_prefix() -> String {
    "/api".into()
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origin: default_allowed_origin(),
            api_prefix: default_api_prefix(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Timezone used when the request does not carry one
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Replace the built-in persona template (`{timezone}` and `{date}` are substituted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,
}

fn default_timezone() -> String {
    "UTC".into()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            system_prompt_override: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_llm_timeout")]
    pub llm_secs: u64,

    #[serde(default = "default_weather_timeout")]
    pub weather_secs: u64,
}

fn default_llm_timeout() -> u64 {
    30
}
fn default_weather_timeout() -> u64 {
    10
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_secs: default_llm_timeout(),
            weather_secs: default_weather_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.celeste/config.toml).
    ///
    /// Then applies environment overrides, see [`AppConfig::apply_env`].
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with(&config_path, |key| std::env::var(key).ok())
    }

    /// Read `path`, apply overrides from `lookup`, then validate the result.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load_from(path)?;
        config.apply_env(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parse a specific file path. Not validated: overrides may still apply.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// - `GEMINI_API_KEY`, then `CELESTE_API_KEY`, then `OPENAI_API_KEY` → `api_key`
    ///   (only when the file left it unset)
    /// - `WEATHERAPI_KEY` → `weather.api_key` (only when unset)
    /// - `CELESTE_PROVIDER`, `CELESTE_MODEL`, `CELESTE_PORT`, `CELESTE_TIMEZONE`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = non_empty("GEMINI_API_KEY")
                .or_else(|| non_empty("CELESTE_API_KEY"))
                .or_else(|| non_empty("OPENAI_API_KEY"));
        }

        if self.weather.api_key.is_none() {
            self.weather.api_key = non_empty("WEATHERAPI_KEY");
        }

        if let Some(provider) = non_empty("CELESTE_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = non_empty("CELESTE_MODEL") {
            self.default_model = model;
        }

        if let Some(port) = non_empty("CELESTE_PORT") {
            match port.parse() {
                Ok(port) => self.gateway.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid CELESTE_PORT"),
            }
        }

        if let Some(tz) = non_empty("CELESTE_TIMEZONE") {
            self.persona.timezone = tz;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".celeste")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, t) in [
            ("default_temperature", self.default_temperature),
            ("extraction_temperature", self.extraction_temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0.0 and 2.0"
                )));
            }
        }

        if self.timeouts.llm_secs == 0 || self.timeouts.weather_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be at least 1 second".into(),
            ));
        }

        if celeste_core::persona::parse_timezone(&self.persona.timezone).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "unknown timezone '{}'",
                self.persona.timezone
            )));
        }

        if !self.gateway.api_prefix.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "gateway.api_prefix must start with '/'".into(),
            ));
        }

        Ok(())
    }

    /// The key `provider` will be built with: its own entry first, then the global key.
    pub fn provider_api_key(&self, provider: &str) -> Option<&str> {
        self.providers
            .get(provider)
            .and_then(|p| p.api_key.as_deref())
            .or(self.api_key.as_deref())
            .filter(|key| !key.trim().is_empty())
    }

    /// The model requests go to: the default provider's own model, else `default_model`.
    pub fn resolved_model(&self) -> &str {
        self.providers
            .get(&self.default_provider)
            .and_then(|p| p.default_model.as_deref())
            .unwrap_or(&self.default_model)
    }

    /// Whether the default provider has a language-model key (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.provider_api_key(&self.default_provider).is_some()
    }

    /// The language-model key is mandatory; the server refuses to start without it.
    pub fn require_api_key(&self) -> Result<(), ConfigError> {
        if self.has_api_key() {
            Ok(())
        } else {
            Err(ConfigError::MissingApiKey)
        }
    }

    pub fn has_weather_key(&self) -> bool {
        self.weather.api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            extraction_temperature: 0.0,
            providers: HashMap::new(),
            weather: WeatherConfig::default(),
            gateway: GatewayConfig::default(),
            persona: PersonaConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("No language-model API key configured (set GEMINI_API_KEY or api_key in config.toml)")]
    MissingApiKey,
}
