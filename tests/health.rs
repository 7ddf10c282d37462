//! Integration tests for /, /health and /metrics

use agentbank::agent::{CommittedModel, Responder};
use agentbank::customers::CustomerStore;
use agentbank::handlers::{self, AppState};
use agentbank::llm::{InvokeError, LanguageModel, ModelCandidate};
use agentbank::metrics::Metrics;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`

struct StaticModel;

#[async_trait]
impl LanguageModel for StaticModel {
    fn model_id(&self) -> &str {
        "gemini-1.5-flash"
    }

    async fn invoke(&self, _prompt: &str) -> Result<String, InvokeError> {
        Ok("ok".to_string())
    }
}

fn create_app(with_model: bool) -> Router {
    let responder = with_model.then(|| {
        Responder::new(
            CommittedModel::new(
                ModelCandidate::from("gemini-1.5-flash"),
                Arc::new(StaticModel),
            ),
            Duration::from_secs(1),
        )
    });

    let state = AppState::new(
        CustomerStore::sample(),
        responder,
        Metrics::new().expect("should create metrics"),
    );
    handlers::router(state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_root_reports_online() {
    let (status, body) = get(create_app(false), "/").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"status": "online", "message": "API do Agente Bancário pronta."})
    );
}

#[tokio::test]
async fn test_health_with_committed_model() {
    let (status, body) = get(create_app(true), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "status": "OK",
            "agent": "ready",
            "model": "gemini-1.5-flash",
            "probe_latency_ms": 0
        })
    );
}

#[tokio::test]
async fn test_health_without_model_is_still_ok() {
    let (status, body) = get(create_app(false), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "status": "OK",
            "agent": "unavailable",
            "model": null,
            "probe_latency_ms": null
        })
    );
}

#[tokio::test]
async fn test_metrics_exposes_counters_after_traffic() {
    let app = create_app(false);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/intencao")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"pergunta": "quero um empréstimo"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("agentbank_intent_classifications_total"));
    assert!(text.contains(r#"intent="solicitar_emprestimo""#));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _) = get(create_app(false), "/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
