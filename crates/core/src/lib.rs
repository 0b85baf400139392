//! # Celeste Core
//!
//! Domain types, traits, and error definitions for the Celeste assistant
//! backend. This crate has **no HTTP or framework dependencies**: it defines
//! the domain model that the provider, weather, agent, and gateway crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (language model, weather provider) is a trait
//! here. Implementations live in their own crates, which keeps the context
//! pipeline testable with scripted fakes.

pub mod error;
pub mod location;
pub mod message;
pub mod persona;
pub mod prompt;
pub mod provider;
pub mod weather;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, WeatherError};
pub use location::{Coordinates, EffectiveLocation, LocationResolution};
pub use message::{ChatHistory, ChatTurn, Message, Role, Sender};
pub use persona::Persona;
pub use prompt::PromptBundle;
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use weather::{WeatherReport, WeatherSnapshot, WeatherSource};
