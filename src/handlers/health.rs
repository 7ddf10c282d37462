//! Health check endpoint
//!
//! Reports whether the conversational surface is enabled and which model
//! it uses. Always 200: a disabled agent is a degraded mode, not an outage.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// "ready" when a model was committed at startup, otherwise "unavailable"
    pub agent: &'static str,
    /// Committed model identifier
    pub model: Option<String>,
    /// Duration of the committed model's startup probe, in milliseconds
    pub probe_latency_ms: Option<u64>,
}

pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (agent, model, probe_latency_ms) = match state.responder() {
        Some(responder) => (
            "ready",
            Some(responder.model_id().to_string()),
            Some(responder.probe_latency().as_millis() as u64),
        ),
        None => ("unavailable", None, None),
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            agent,
            model,
            probe_latency_ms,
        }),
    )
}
