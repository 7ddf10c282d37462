//! Root liveness endpoint

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// GET / - always 200, no state needed
pub async fn handler() -> Json<RootResponse> {
    Json(RootResponse {
        status: "online",
        message: "API do Agente Bancário pronta.",
    })
}
