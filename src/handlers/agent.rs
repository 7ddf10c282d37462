//! Conversational endpoint
//!
//! Handles POST /agente by forwarding the question to the committed model.

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::handlers::extractor::BankJson;
use crate::metrics::AgentOutcome;
use crate::middleware::RequestId;
use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Deserializer, Serialize};

/// Maximum allowed question length in characters
pub const MAX_QUESTION_LENGTH: usize = 10_000;

/// Body of `POST /agente` and `POST /intencao`
///
/// Validation is enforced during deserialization - invalid instances cannot exist.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionRequest {
    pergunta: String,
}

impl QuestionRequest {
    /// Get the question text
    pub fn pergunta(&self) -> &str {
        &self.pergunta
    }

    pub fn into_pergunta(self) -> String {
        self.pergunta
    }
}

impl<'de> Deserialize<'de> for QuestionRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawQuestionRequest {
            pergunta: String,
        }

        let raw = RawQuestionRequest::deserialize(deserializer)?;

        // Count Unicode characters, not bytes
        let char_count = raw.pergunta.chars().count();
        if char_count > MAX_QUESTION_LENGTH {
            return Err(serde::de::Error::custom(format!(
                "pergunta exceeds maximum length of {} characters (got {})",
                MAX_QUESTION_LENGTH, char_count
            )));
        }

        Ok(QuestionRequest {
            pergunta: raw.pergunta,
        })
    }
}

/// Response of `POST /agente`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub pergunta: String,
    pub resposta: String,
}

/// POST /agente handler
///
/// Returns 503 without touching the network when no model was committed at
/// startup. Model failures are already turned into the safe message by the
/// responder, so a committed agent always answers 200.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    BankJson(request): BankJson<QuestionRequest>,
) -> AppResult<Json<AgentResponse>> {
    let Some(responder) = state.responder() else {
        tracing::warn!(
            request_id = %request_id,
            "Conversational request rejected: no model was committed at startup"
        );
        state
            .metrics()
            .record_agent_request(AgentOutcome::Unavailable);
        return Err(AppError::AgentUnavailable);
    };

    tracing::debug!(
        request_id = %request_id,
        model = %responder.model_id(),
        question_length = request.pergunta().len(),
        "Received agent question"
    );

    let resposta = responder.respond(request.pergunta()).await;

    tracing::info!(
        request_id = %request_id,
        model = %responder.model_id(),
        response_length = resposta.len(),
        "Agent request completed"
    );

    Ok(Json(AgentResponse {
        pergunta: request.into_pergunta(),
        resposta,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_request_deserializes() {
        let req: QuestionRequest =
            serde_json::from_str(r#"{"pergunta": "Qual meu saldo?"}"#).expect("should deserialize");
        assert_eq!(req.pergunta(), "Qual meu saldo?");
    }

    #[test]
    fn test_question_request_allows_empty_text() {
        let req: QuestionRequest =
            serde_json::from_str(r#"{"pergunta": ""}"#).expect("empty text is allowed");
        assert_eq!(req.pergunta(), "");
    }

    #[test]
    fn test_question_request_requires_pergunta() {
        assert!(serde_json::from_str::<QuestionRequest>(r#"{"question": "oi"}"#).is_err());
    }

    #[test]
    fn test_question_request_rejects_too_long_text() {
        let json = format!(r#"{{"pergunta": "{}"}}"#, "a".repeat(MAX_QUESTION_LENGTH + 1));
        let err = serde_json::from_str::<QuestionRequest>(&json).expect_err("too long");
        assert!(err.to_string().contains("exceeds maximum length"));
    }

    #[test]
    fn test_length_limit_counts_characters() {
        // 4 bytes each in UTF-8, one character each
        let json = format!(r#"{{"pergunta": "{}"}}"#, "💰".repeat(MAX_QUESTION_LENGTH));
        assert!(serde_json::from_str::<QuestionRequest>(&json).is_ok());
    }
}
