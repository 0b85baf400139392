//! HTTP API gateway for Celeste.
//!
//! Exposes the ask endpoint under the configured API prefix plus a health
//! check. Cross-origin access is granted to a single frontend origin and only
//! on the API routes.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, response::Json, routing::get};
use celeste_config::{AppConfig, GatewayConfig};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

pub use api::{ApiState, AskRequest, AskResponse, ErrorResponse, SharedApiState};

/// Build the full router.
///
/// Layers applied:
/// - CORS for `gateway.allowed_origin` on the API routes only
/// - Request body size limit (`gateway.max_body_bytes`)
/// - HTTP trace logging
pub fn build_router(state: SharedApiState, config: &GatewayConfig) -> Router {
    let api = api::api_router(state).layer(cors_layer(&config.allowed_origin));

    let prefix = config.api_prefix.trim_end_matches('/');
    let router = Router::new().route("/health", get(health_handler));
    let router = if prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(prefix, api)
    };

    router
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let origin = match HeaderValue::from_str(allowed_origin) {
        Ok(origin) => AllowOrigin::list([origin]),
        Err(e) => {
            warn!(origin = %allowed_origin, error = %e, "Invalid allowed origin, cross-origin requests disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
///
/// A missing language-model key is fatal; a missing weather key only
/// disables weather context.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.require_api_key()?;
    if !config.has_weather_key() {
        warn!("WEATHERAPI_KEY not set, replies will carry no weather context");
    }

    let celeste = celeste_agent::Celeste::from_config(&config)?;
    let state = Arc::new(ApiState {
        celeste: Arc::new(celeste),
    });
    let app = build_router(state, &config.gateway);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    info!(
        addr = %addr,
        prefix = %config.gateway.api_prefix,
        origin = %config.gateway.allowed_origin,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
