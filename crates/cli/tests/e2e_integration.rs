//! End-to-end integration tests for Celeste.
//!
//! These drive the real gateway router, the real Gemini provider, and the real
//! WeatherAPI.com client. Both upstream services are replaced by in-process
//! axum servers on 127.0.0.1 that record what they receive.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use celeste_agent::{Celeste, FALLBACK_REPLY};
use celeste_config::{AppConfig, ProviderConfig};
use celeste_gateway::ApiState;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

// ── Mock upstreams ───────────────────────────────────────────────────────

#[derive(Default)]
struct Recorded {
    gemini_bodies: Mutex<Vec<Value>>,
    weather_queries: Mutex<Vec<String>>,
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
}

fn last_text(body: &Value) -> String {
    body["contents"]
        .as_array()
        .and_then(|c| c.last())
        .and_then(|c| c["parts"][0]["text"].as_str())
        .unwrap_or_default()
        .to_string()
}

/// Mock Gemini: extraction calls get `extraction`, chat calls get `reply`.
async fn mock_gemini(recorded: Arc<Recorded>, extraction: &'static str, reply: &'static str) -> String {
    let router = Router::new()
        .route(
            "/models/{call}",
            post(
                move |State(recorded): State<Arc<Recorded>>,
                 Path(call): Path<String>,
                 Json(body): Json<Value>| async move {
                    assert!(call.ends_with(":generateContent"));
                    let text = if last_text(&body).ends_with("Location:") {
                        extraction
                    } else {
                        reply
                    };
                    recorded.gemini_bodies.lock().unwrap().push(body);
                    Json(json!({
                        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
                    }))
                },
            ),
        )
        .with_state(recorded);
    spawn(router).await
}

async fn mock_weather(recorded: Arc<Recorded>) -> String {
    let router = Router::new()
        .route(
            "/forecast.json",
            get(
                |State(recorded): State<Arc<Recorded>>,
                 Query(params): Query<HashMap<String, String>>| async move {
                    recorded
                        .weather_queries
                        .lock()
                        .unwrap()
                        .push(params.get("q").cloned().unwrap_or_default());
                    Json(json!({
                        "location": {"name": "Tokyo", "lat": 35.69, "lon": 139.69},
                        "current": {
                            "temp_c": 16.0,
                            "cloud": 25,
                            "vis_km": 10.0,
                            "condition": {"text": "Partly cloudy"}
                        }
                    }))
                },
            ),
        )
        .with_state(recorded);
    spawn(router).await
}

fn config(gemini_base: &str, weather_base: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.api_key = Some("test-gemini-key".into());
    config.providers.insert(
        "gemini".into(),
        ProviderConfig {
            api_key: None,
            api_url: Some(gemini_base.into()),
            default_model: None,
        },
    );
    config.weather.api_key = Some("test-weather-key".into());
    config.weather.base_url = weather_base.into();
    config
}

async fn app(config: &AppConfig) -> Router {
    let celeste = Celeste::from_config(config).unwrap();
    celeste_gateway::build_router(
        Arc::new(ApiState {
            celeste: Arc::new(celeste),
        }),
        &config.gateway,
    )
}

async fn ask(app: Router, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/ask")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_explicit_city_drives_weather_context() {
    let recorded = Arc::new(Recorded::default());
    let gemini = mock_gemini(recorded.clone(), "Tokyo", "Clouds are trolling Tokyo tonight 😏").await;
    let weather = mock_weather(recorded.clone()).await;

    let (status, body) = ask(
        app(&config(&gemini, &weather)).await,
        json!({"query": "What's the sky like in Tokyo tonight?", "history": []}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "Clouds are trolling Tokyo tonight 😏"}));
    assert_eq!(*recorded.weather_queries.lock().unwrap(), ["Tokyo"]);

    let bodies = recorded.gemini_bodies.lock().unwrap();
    assert_eq!(bodies.len(), 2);
    let prompt = last_text(&bodies[1]);
    assert!(prompt.contains(
        "(Local context for Tokyo: Weather is Partly cloudy, Cloud cover: 25%."
    ));
    assert!(prompt.contains("You are 'Celeste'"));
    assert!(prompt.ends_with("User: What's the sky like in Tokyo tonight?"));
}

#[tokio::test]
async fn e2e_coordinates_and_history() {
    let recorded = Arc::new(Recorded::default());
    let gemini = mock_gemini(recorded.clone(), "None", "Look up, Orion is rising ✨").await;
    let weather = mock_weather(recorded.clone()).await;

    let (status, body) = ask(
        app(&config(&gemini, &weather)).await,
        json!({
            "query": "any stars tonight?",
            "latitude": 40.7,
            "longitude": -74.0,
            "history": [{"sender": "user", "text": "hi"}]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Look up, Orion is rising ✨");
    assert_eq!(*recorded.weather_queries.lock().unwrap(), ["40.7,-74.0"]);

    let bodies = recorded.gemini_bodies.lock().unwrap();
    let chat = bodies[1]["contents"].as_array().unwrap();
    assert_eq!(chat.len(), 2);
    assert_eq!(chat[0]["role"], "user");
    assert_eq!(chat[0]["parts"][0]["text"], "hi");
    assert!(last_text(&bodies[1]).contains("Local context for your location"));
}

#[tokio::test]
async fn e2e_no_location_means_no_weather_call() {
    let recorded = Arc::new(Recorded::default());
    let gemini = mock_gemini(recorded.clone(), "None", "Fun fact: Venus spins backwards").await;
    let weather = mock_weather(recorded.clone()).await;

    let (status, body) = ask(
        app(&config(&gemini, &weather)).await,
        json!({"query": "tell me something cosmic"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Fun fact: Venus spins backwards");
    assert!(recorded.weather_queries.lock().unwrap().is_empty());
    assert!(!last_text(&recorded.gemini_bodies.lock().unwrap()[1]).contains("Local context"));
}

#[tokio::test]
async fn e2e_unreachable_model_returns_fallback() {
    let recorded = Arc::new(Recorded::default());
    let weather = mock_weather(recorded.clone()).await;
    // Nothing listens on the discard port.
    let config = config("http://127.0.0.1:9", &weather);

    let (status, body) = ask(app(&config).await, json!({"query": "stars over Lima?"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], FALLBACK_REPLY);
    assert!(recorded.weather_queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn e2e_missing_weather_key_degrades_silently() {
    let recorded = Arc::new(Recorded::default());
    let gemini = mock_gemini(recorded.clone(), "Tokyo", "Hard to say without the clouds").await;
    let weather = mock_weather(recorded.clone()).await;
    let mut config = config(&gemini, &weather);
    config.weather.api_key = None;

    let (status, body) = ask(app(&config).await, json!({"query": "Tokyo sky?"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Hard to say without the clouds");
    assert!(recorded.weather_queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn e2e_missing_query_is_rejected() {
    let recorded = Arc::new(Recorded::default());
    let gemini = mock_gemini(recorded.clone(), "Tokyo", "unused").await;
    let weather = mock_weather(recorded.clone()).await;

    let (status, body) = ask(app(&config(&gemini, &weather)).await, json!({"history": []})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Query not provided"}));
    assert!(recorded.gemini_bodies.lock().unwrap().is_empty());
    assert!(recorded.weather_queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn serve_without_model_key_fails_fast() {
    let err = celeste_gateway::start(AppConfig::default()).await.unwrap_err();
    assert!(err.to_string().contains("API key"));
}
