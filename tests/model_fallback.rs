//! Integration tests for startup model selection
//!
//! Drives `ModelInitializer` against a mocked Gemini API and verifies the
//! ordered, first-success-wins scan over real HTTP.

use agentbank::agent::{InitError, InitializationOutcome, ModelInitializer, Responder};
use agentbank::llm::{GeminiConnector, ModelCandidate};
use agentbank::metrics::{Metrics, ProbeOutcome};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = "test-key";

fn generate_path(model: &str) -> String {
    format!("/v1beta/models/{}:generateContent", model)
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    }))
}

fn error_response(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({
        "error": {"code": status, "message": message, "status": "ERROR"}
    }))
}

fn candidates(names: &[&str]) -> Vec<ModelCandidate> {
    names.iter().copied().map(ModelCandidate::from).collect()
}

fn initializer(server: &MockServer, probe_timeout: Duration) -> ModelInitializer {
    let connector = GeminiConnector::new(&server.uri(), 0.0, Duration::from_secs(5))
        .expect("should build connector");
    ModelInitializer::new(Arc::new(connector), "Olá", probe_timeout)
}

#[tokio::test]
async fn test_second_candidate_is_committed_and_third_never_contacted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_path("gemini-a")))
        .respond_with(error_response(404, "models/gemini-a is not found"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(generate_path("gemini-b")))
        .and(header("x-goog-api-key", TEST_KEY))
        .respond_with(text_response("Olá! Como posso ajudar?"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(generate_path("gemini-c")))
        .respond_with(text_response("should never be asked"))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = initializer(&server, Duration::from_secs(5))
        .initialize(
            Some(TEST_KEY),
            "GOOGLE_API_KEY",
            &candidates(&["gemini-a", "gemini-b", "gemini-c"]),
        )
        .await;

    let committed = outcome.into_committed().expect("gemini-b should be committed");
    assert_eq!(committed.candidate().as_str(), "gemini-b");
    assert!(committed.probe_latency() > Duration::ZERO);

    server.verify().await;
}

#[tokio::test]
async fn test_all_failing_candidates_report_each_reason() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_path("gemini-a")))
        .respond_with(error_response(429, "Resource has been exhausted"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(generate_path("gemini-b")))
        .respond_with(error_response(403, "Permission denied"))
        .mount(&server)
        .await;

    let outcome = initializer(&server, Duration::from_secs(5))
        .initialize(
            Some(TEST_KEY),
            "GOOGLE_API_KEY",
            &candidates(&["gemini-a", "gemini-b"]),
        )
        .await;

    match outcome {
        InitializationOutcome::Failed(InitError::NoModelAvailable { failures }) => {
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0].candidate.as_str(), "gemini-a");
            assert_eq!(failures[0].reason.kind(), "quota");
            assert_eq!(failures[1].candidate.as_str(), "gemini-b");
            assert_eq!(failures[1].reason.kind(), "auth");
        }
        other => panic!("expected NoModelAvailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_candidate_list_never_touches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(text_response("unexpected"))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = initializer(&server, Duration::from_secs(5))
        .initialize(Some(TEST_KEY), "GOOGLE_API_KEY", &[])
        .await;

    assert!(matches!(
        outcome,
        InitializationOutcome::Failed(InitError::NoModelAvailable { ref failures })
            if failures.is_empty()
    ));
    server.verify().await;
}

#[tokio::test]
async fn test_missing_key_never_touches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(text_response("unexpected"))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = initializer(&server, Duration::from_secs(5))
        .initialize(None, "BANK_KEY", &candidates(&["gemini-a"]))
        .await;

    match outcome {
        InitializationOutcome::Failed(e @ InitError::MissingCredential { .. }) => {
            assert!(e.to_string().contains("BANK_KEY"));
        }
        other => panic!("expected MissingCredential, got {:?}", other),
    }
    server.verify().await;
}

#[tokio::test]
async fn test_slow_probe_times_out_and_falls_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_path("gemini-slow")))
        .respond_with(text_response("late").set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(generate_path("gemini-fast")))
        .respond_with(text_response("Olá"))
        .mount(&server)
        .await;

    let metrics = Metrics::new().expect("should create metrics");
    let outcome = initializer(&server, Duration::from_millis(200))
        .with_metrics(metrics.clone())
        .initialize(
            Some(TEST_KEY),
            "GOOGLE_API_KEY",
            &candidates(&["gemini-slow", "gemini-fast"]),
        )
        .await;

    let committed = outcome.into_committed().expect("gemini-fast should be committed");
    assert_eq!(committed.candidate().as_str(), "gemini-fast");
    assert_eq!(metrics.probe_count(ProbeOutcome::Failure), 1);
    assert_eq!(metrics.probe_count(ProbeOutcome::Success), 1);
}

#[tokio::test]
async fn test_committed_model_serves_later_requests() {
    let server = MockServer::start().await;

    // Probe and question both land on the committed model
    Mock::given(method("POST"))
        .and(path(generate_path("gemini-b")))
        .respond_with(text_response("Seu saldo pode ser consultado no app."))
        .expect(2)
        .mount(&server)
        .await;

    let committed = initializer(&server, Duration::from_secs(5))
        .initialize(Some(TEST_KEY), "GOOGLE_API_KEY", &candidates(&["gemini-b"]))
        .await
        .into_committed()
        .expect("gemini-b should be committed");

    let probe_latency = committed.probe_latency();
    let responder = Responder::new(committed, Duration::from_secs(5));
    assert_eq!(responder.probe_latency(), probe_latency);
    let text = responder.respond("Como vejo meu saldo?").await;

    assert_eq!(text, "Seu saldo pode ser consultado no app.");
    server.verify().await;
}
