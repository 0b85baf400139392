//! The composed prompt handed to the response generator.

use crate::weather::WeatherSnapshot;
use serde::Serialize;

/// Persona instructions, optional local context, and the user's query,
/// separated by blank lines. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptBundle {
    text: String,
    has_context: bool,
}

impl PromptBundle {
    pub fn compose(persona: &str, context_line: Option<&str>, query: &str) -> Self {
        let mut text = String::with_capacity(persona.len() + query.len() + 256);
        text.push_str(persona.trim_end());
        text.push_str("\n\n");
        if let Some(line) = context_line {
            text.push_str(line);
            text.push_str("\n\n");
        }
        text.push_str("User: ");
        text.push_str(query);

        Self {
            text,
            has_context: context_line.is_some(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether a weather/location context line was included.
    pub fn has_context(&self) -> bool {
        self.has_context
    }
}

impl std::fmt::Display for PromptBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// One-line local context the model is asked to weave into its reply.
pub fn context_line(display_name: &str, snapshot: &WeatherSnapshot) -> String {
    format!(
        "(Local context for {display_name}: Weather is {}, Cloud cover: {}%. \
         Integrate this naturally into your response like a friend giving advice.)",
        snapshot.description, snapshot.cloud_cover_percent
    )
}
