//! The full request pipeline: assemble context, then generate the reply.

use crate::assembler::{AssembledContext, AssemblyInput, ContextAssembler};
use crate::extractor::LocationExtractor;
use crate::responder::ResponseGenerator;
use celeste_config::AppConfig;
use celeste_core::error::Error;
use celeste_core::location::Coordinates;
use celeste_core::message::ChatTurn;
use celeste_core::persona::{self, Persona};
use celeste_core::provider::Provider;
use celeste_core::weather::WeatherSource;
use celeste_weather::WeatherApiClient;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::info;

/// One inbound question.
#[derive(Debug, Clone, Copy)]
pub struct AskInput<'a> {
    pub query: &'a str,
    pub history: &'a [ChatTurn],
    pub coordinates: Option<Coordinates>,
    pub timezone: Option<&'a str>,
}

/// The reply together with the context it was generated from.
#[derive(Debug, Clone)]
pub struct Answer {
    pub reply: String,
    pub context: AssembledContext,
}

/// Celeste: stateless across requests, shareable behind an `Arc`.
pub struct Celeste {
    assembler: ContextAssembler,
    generator: ResponseGenerator,
}

impl Celeste {
    pub fn new(assembler: ContextAssembler, generator: ResponseGenerator) -> Self {
        Self {
            assembler,
            generator,
        }
    }

    /// Wire a pipeline from one provider and one weather source using config settings.
    pub fn with_collaborators(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        weather: Arc<dyn WeatherSource>,
    ) -> Self {
        let model = config.resolved_model();

        let timezone = persona::parse_timezone(&config.persona.timezone).unwrap_or(Tz::UTC);

        let extractor = LocationExtractor::new(provider.clone(), model)
            .with_temperature(config.extraction_temperature);
        let assembler = ContextAssembler::new(extractor, weather)
            .with_persona(Persona::with_override(
                config.persona.system_prompt_override.as_deref(),
            ))
            .with_default_timezone(timezone);
        let generator = ResponseGenerator::new(provider, model)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens);

        Self::new(assembler, generator)
    }

    /// Build the production pipeline: the configured provider and WeatherAPI.com.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let router = celeste_providers::router::build_from_config(config)?;
        let provider = router.default().ok_or_else(|| Error::Config {
            message: format!("Provider '{}' is not available", config.default_provider),
        })?;
        let weather = Arc::new(WeatherApiClient::from_config(config)?);

        info!(
            provider = %provider.name(),
            model = %config.resolved_model(),
            weather = weather.is_configured(),
            "Celeste pipeline ready"
        );

        Ok(Self::with_collaborators(config, provider, weather))
    }

    /// Answer `input`, returning the reply and the assembled context.
    pub async fn answer(&self, input: AskInput<'_>) -> Answer {
        let context = self
            .assembler
            .assemble(AssemblyInput {
                query: input.query,
                coordinates: input.coordinates,
                timezone: input.timezone,
            })
            .await;
        let reply = self.generator.respond(&context.bundle, input.history).await;
        Answer { reply, context }
    }

    /// Answer `input` with the reply text only.
    pub async fn ask(&self, input: AskInput<'_>) -> String {
        self.answer(input).await.reply
    }
}
