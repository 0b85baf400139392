//! Context assembly pipeline: the one piece of decision logic in Celeste.
//!
//! For each request:
//!
//! 1. **Extract** a location from the query (explicit name, "where I am", or nothing)
//! 2. **Resolve** the effective location: explicit mention wins, caller coordinates
//!    are the fallback, otherwise none
//! 3. **Look up** weather only when an effective location exists
//! 4. **Compose** persona instructions, the optional context line and the query
//!    into a [`PromptBundle`]
//!
//! Collaborator failures never escape: extraction degrades to no location and
//! weather degrades to no context line.

use crate::extractor::LocationExtractor;
use celeste_core::location::{Coordinates, EffectiveLocation};
use celeste_core::persona::{self, Persona};
use celeste_core::prompt::{self, PromptBundle};
use celeste_core::weather::{WeatherSnapshot, WeatherSource};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{debug, warn};

// ── Types ─────────────────────────────────────────────────────────────────

/// Per-request inputs.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyInput<'a> {
    /// The user's new message.
    pub query: &'a str,
    /// Caller position, present only when both halves were supplied.
    pub coordinates: Option<Coordinates>,
    /// Requested IANA timezone; falls back to the configured default.
    pub timezone: Option<&'a str>,
}

/// The result of assembly.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    /// The prompt handed to the response generator.
    pub bundle: PromptBundle,
    /// The location that drove the weather lookup, if any.
    pub effective_location: Option<EffectiveLocation>,
    /// Current conditions, present only when a lookup succeeded.
    pub weather: Option<WeatherSnapshot>,
    /// Timezone the persona was rendered in.
    pub timezone: Tz,
}

// ── Assembler ─────────────────────────────────────────────────────────────

pub struct ContextAssembler {
    extractor: LocationExtractor,
    weather: Arc<dyn WeatherSource>,
    persona: Persona,
    default_timezone: Tz,
}

impl ContextAssembler {
    pub fn new(extractor: LocationExtractor, weather: Arc<dyn WeatherSource>) -> Self {
        Self {
            extractor,
            weather,
            persona: Persona::default(),
            default_timezone: Tz::UTC,
        }
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_default_timezone(mut self, tz: Tz) -> Self {
        self.default_timezone = tz;
        self
    }

    /// Assemble the prompt for `input` as of now.
    pub async fn assemble(&self, input: AssemblyInput<'_>) -> AssembledContext {
        self.assemble_at(input, Utc::now()).await
    }

    /// Assemble the prompt for `input`, dating the persona at `now`.
    pub async fn assemble_at(&self, input: AssemblyInput<'_>, now: DateTime<Utc>) -> AssembledContext {
        let resolution = self.extractor.extract(input.query).await;
        let effective_location = EffectiveLocation::resolve(&resolution, input.coordinates);

        let weather = match &effective_location {
            Some(location) => {
                // Resolved coordinates are not needed past this point.
                let (_, snapshot) = self.weather.lookup(&location.query).await;
                snapshot
            }
            None => {
                debug!("No effective location, skipping weather lookup");
                None
            }
        };

        let timezone = self.resolve_timezone(input.timezone);
        let instructions = self.persona.render(timezone, now);

        let context = match (&effective_location, &weather) {
            (Some(location), Some(snapshot)) => {
                Some(prompt::context_line(&location.display_name, snapshot))
            }
            _ => None,
        };

        let bundle = PromptBundle::compose(&instructions, context.as_deref(), input.query);

        debug!(
            location = effective_location.as_ref().map(|l| l.query.as_str()),
            has_context = bundle.has_context(),
            timezone = %timezone.name(),
            "Context assembled"
        );

        AssembledContext {
            bundle,
            effective_location,
            weather,
            timezone,
        }
    }

    fn resolve_timezone(&self, requested: Option<&str>) -> Tz {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => persona::parse_timezone(name).unwrap_or_else(|| {
                warn!(timezone = %name, fallback = %self.default_timezone.name(), "Unknown timezone");
                self.default_timezone
            }),
            None => self.default_timezone,
        }
    }
}
