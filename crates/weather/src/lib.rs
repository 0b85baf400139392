//! Weather lookup for Celeste.
//!
//! One HTTP call per request against WeatherAPI.com's `forecast.json`,
//! returning the resolved coordinates and current conditions. Every failure
//! is a [`celeste_core::WeatherError`]; callers decide how to degrade.

pub mod weatherapi;

pub use weatherapi::WeatherApiClient;
