//! Intent classification endpoint
//!
//! POST /intencao runs the keyword classifier. The model is never involved.

use crate::handlers::AppState;
use crate::handlers::agent::QuestionRequest;
use crate::handlers::extractor::BankJson;
use crate::intent::{IntentLabel, classify};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResponse {
    pub pergunta: String,
    pub intencao: IntentLabel,
}

pub async fn handler(
    State(state): State<AppState>,
    BankJson(request): BankJson<QuestionRequest>,
) -> Json<IntentResponse> {
    let intencao = classify(request.pergunta());
    state.metrics().record_intent(intencao);

    tracing::debug!(intent = %intencao, "Classified question");

    Json(IntentResponse {
        pergunta: request.into_pergunta(),
        intencao,
    })
}
