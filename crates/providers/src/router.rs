//! Provider router: selects the correct LLM provider based on config.
//!
//! Handles provider creation and routing requests to the right backend.

use crate::gemini::GeminiProvider;
use crate::openai_compat::OpenAiCompatProvider;
use celeste_core::error::ProviderError;
use celeste_core::provider::Provider;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }
}

/// Build providers from configuration.
pub fn build_from_config(
    config: &celeste_config::AppConfig,
) -> Result<ProviderRouter, ProviderError> {
    let timeout = Duration::from_secs(config.timeouts.llm_secs);
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = config.provider_api_key(name).unwrap_or_default();
        let provider = build_one(name, provider_config.api_url.as_deref(), api_key, timeout)?;
        router.register(name.clone(), provider);
    }

    // Ensure the default provider exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        let api_key = config.provider_api_key(&config.default_provider).unwrap_or_default();
        let provider = build_one(&config.default_provider, None, api_key, timeout)?;
        router.register(config.default_provider.clone(), provider);
    }

    Ok(router)
}

fn build_one(
    name: &str,
    api_url: Option<&str>,
    api_key: &str,
    timeout: Duration,
) -> Result<Arc<dyn Provider>, ProviderError> {
    if name == "gemini" {
        let mut p = GeminiProvider::new(api_key, timeout)?;
        if let Some(url) = api_url {
            p = p.with_base_url(url);
        }
        return Ok(Arc::new(p));
    }

    let base_url = api_url
        .map(str::to_string)
        .unwrap_or_else(|| default_base_url(name));
    Ok(Arc::new(OpenAiCompatProvider::new(name, &base_url, api_key, timeout)?))
}

/// Get the default base URL for well-known OpenAI-compatible providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celeste_config::{AppConfig, ProviderConfig};

    #[test]
    fn router_register_and_lookup() {
        let mut router = ProviderRouter::new("openai");
        let provider = Arc::new(
            OpenAiCompatProvider::new("openai", "https://api.openai.com/v1", "sk-test", Duration::from_secs(5))
                .unwrap(),
        );
        router.register("openai", provider);

        assert!(router.get("openai").is_some());
        assert!(router.get("nonexistent").is_none());
        assert!(router.default().is_some());
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn build_from_default_config_uses_gemini() {
        let router = build_from_config(&AppConfig::default()).unwrap();
        assert_eq!(router.default().unwrap().name(), "gemini");
    }

    #[test]
    fn configured_providers_are_registered() {
        let mut config = AppConfig::default();
        config.default_provider = "ollama".into();
        config.providers.insert(
            "ollama".into(),
            ProviderConfig {
                api_key: None,
                api_url: Some("http://gpu-box:11434/v1".into()),
                default_model: Some("llama3".into()),
            },
        );

        let router = build_from_config(&config).unwrap();
        assert_eq!(router.default().unwrap().name(), "ollama");
        assert!(router.get("gemini").is_none());
    }
}
