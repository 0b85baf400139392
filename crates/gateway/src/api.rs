//! The ask API, mounted under the configured prefix (default `/api`).
//!
//! `POST /ask` takes `{query, history?, latitude?, longitude?, timezone?}` and
//! always answers `{"response": …}` once a query is present. The only error
//! statuses are client errors for a missing query or an unreadable body.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
};
use celeste_agent::{AskInput, Celeste};
use celeste_core::location::Coordinates;
use celeste_core::message::ChatTurn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub const QUERY_NOT_PROVIDED: &str = "Query not provided";

/// Shared state for the API routes.
pub struct ApiState {
    pub celeste: Arc<Celeste>,
}

pub type SharedApiState = Arc<ApiState>;

/// Build the API router (without the prefix).
pub fn api_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/ask", post(ask_handler))
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<ChatTurn>>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Parse a request body. An empty body and JSON `null` both parse as "no fields".
pub fn parse_request(body: &[u8]) -> Result<AskRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(AskRequest::default());
    }
    serde_json::from_slice::<Option<AskRequest>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| bad_request(format!("Invalid request body: {e}")))
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn ask_handler(
    State(state): State<SharedApiState>,
    body: Bytes,
) -> Result<Json<AskResponse>, ApiError> {
    let request = parse_request(&body)?;
    let Some(query) = request.query else {
        debug!("Rejected ask request without a query");
        return Err(bad_request(QUERY_NOT_PROVIDED));
    };
    let history = request.history.unwrap_or_default();

    info!(
        query_len = query.len(),
        history = history.len(),
        has_coordinates = request.latitude.is_some() && request.longitude.is_some(),
        "Ask request"
    );

    let response = state
        .celeste
        .ask(AskInput {
            query: &query,
            history: &history,
            coordinates: Coordinates::from_parts(request.latitude, request.longitude),
            timezone: request.timezone.as_deref(),
        })
        .await;

    Ok(Json(AskResponse { response }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use celeste_core::error::{ProviderError, WeatherError};
    use celeste_core::message::{Message, Role};
    use celeste_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use celeste_core::weather::{WeatherReport, WeatherSource};
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Answers extraction with `extraction` and everything else with `reply`.
    struct MockProvider {
        extraction: &'static str,
        reply: Result<&'static str, ProviderError>,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            let is_extraction = request.messages.len() == 1
                && request.messages[0].content.trim_end().ends_with("Location:");
            self.requests.lock().unwrap().push(request);

            let text = if is_extraction {
                self.extraction
            } else {
                self.reply.clone()?
            };
            Ok(ProviderResponse {
                message: Message::assistant(text),
                usage: None,
                model: "mock".into(),
            })
        }
    }

    struct NoWeather {
        queries: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl WeatherSource for NoWeather {
        fn name(&self) -> &str {
            "none"
        }

        async fn fetch(&self, query: &str) -> Result<WeatherReport, WeatherError> {
            self.queries.lock().unwrap().push(query.to_string());
            Err(WeatherError::NotConfigured("test".into()))
        }
    }

    fn fixture(
        extraction: &'static str,
        reply: Result<&'static str, ProviderError>,
    ) -> (Router, Arc<MockProvider>, Arc<NoWeather>) {
        let provider = Arc::new(MockProvider {
            extraction,
            reply,
            requests: Mutex::new(Vec::new()),
        });
        let weather = Arc::new(NoWeather {
            queries: Mutex::new(Vec::new()),
        });
        let celeste = Celeste::with_collaborators(
            &celeste_config::AppConfig::default(),
            provider.clone(),
            weather.clone(),
        );
        let router = api_router(Arc::new(ApiState {
            celeste: Arc::new(celeste),
        }));
        (router, provider, weather)
    }

    fn post_ask(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ask")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_query_is_rejected_without_collaborator_calls() {
        for body in [r#"{"history": []}"#, r#"{"query": null}"#, "null", ""] {
            let (app, provider, weather) = fixture("Tokyo", Ok("hi"));
            let response = app.oneshot(post_ask(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body:?}");
            assert_eq!(
                json_body(response).await,
                serde_json::json!({"error": "Query not provided"})
            );
            assert!(provider.requests.lock().unwrap().is_empty());
            assert!(weather.queries.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_client_error() {
        let (app, provider, _) = fixture("None", Ok("hi"));
        let response = app.oneshot(post_ask("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body:"));
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ask_returns_model_reply() {
        let (app, provider, weather) = fixture("None", Ok("Saturn is up ✨"));
        let body = serde_json::json!({
            "query": "any stars tonight?",
            "latitude": 40.7,
            "longitude": -74.0,
            "history": [{"sender": "user", "text": "hi"}, {"sender": "bot", "text": "hey"}]
        });
        let response = app.oneshot(post_ask(body.to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["response"], "Saturn is up ✨");
        assert_eq!(*weather.queries.lock().unwrap(), ["40.7,-74.0"]);

        let requests = provider.requests.lock().unwrap();
        let roles: Vec<Role> = requests[1].messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant, Role::User]);
    }

    #[tokio::test]
    async fn model_failure_is_still_ok_with_fallback() {
        let (app, _, _) = fixture("None", Err(ProviderError::Network("down".into())));
        let response = app
            .oneshot(post_ask(r#"{"query": "hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["response"],
            celeste_agent::FALLBACK_REPLY
        );
    }

    #[tokio::test]
    async fn lone_latitude_is_ignored() {
        let (app, _, weather) = fixture("None", Ok("ok"));
        let response = app
            .oneshot(post_ask(r#"{"query": "stars?", "latitude": 12.5}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(weather.queries.lock().unwrap().is_empty());
    }

    #[test]
    fn parse_accepts_null_history() {
        let request = parse_request(br#"{"query": "q", "history": null}"#).unwrap();
        assert_eq!(request.query.as_deref(), Some("q"));
        assert!(request.history.is_none());
    }
}
