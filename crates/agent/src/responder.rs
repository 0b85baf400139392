//! Response generation: prior turns plus the assembled prompt, one chat call.

use celeste_core::error::ProviderError;
use celeste_core::message::{ChatTurn, Message};
use celeste_core::prompt::PromptBundle;
use celeste_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use tracing::{debug, error};

/// Returned whenever the model call fails for any reason.
pub const FALLBACK_REPLY: &str = "Oops! My cosmic brain is a little foggy. Try asking again in a moment.";

pub struct ResponseGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ResponseGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// History in order, then the bundle as the newest user message.
    pub fn build_request(&self, bundle: &PromptBundle, history: &[ChatTurn]) -> ProviderRequest {
        let mut messages: Vec<Message> = history.iter().map(Message::from).collect();
        messages.push(Message::user(bundle.as_str()));

        ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub async fn try_respond(
        &self,
        bundle: &PromptBundle,
        history: &[ChatTurn],
    ) -> Result<String, ProviderError> {
        let request = self.build_request(bundle, history);
        debug!(
            provider = %self.provider.name(),
            model = %self.model,
            history = history.len(),
            "Generating reply"
        );
        let response = self.provider.complete(request).await?;
        Ok(response.message.content)
    }

    /// The model's reply verbatim, or [`FALLBACK_REPLY`] on any failure.
    pub async fn respond(&self, bundle: &PromptBundle, history: &[ChatTurn]) -> String {
        match self.try_respond(bundle, history).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(provider = %self.provider.name(), error = %e, "Response generation failed");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
