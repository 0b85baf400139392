//! Language-model provider implementations for Celeste.
//!
//! All providers implement the `celeste_core::Provider` trait.
//! The router selects the correct provider based on configuration.

pub mod gemini;
mod http;
pub mod openai_compat;
pub mod router;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::ProviderRouter;
