//! Conversational responder
//!
//! Wraps the committed model. Every question is prefixed with a fixed
//! persona instruction and forwarded to the model; failures never reach the
//! caller, who gets a fixed user-safe message instead.

use super::initializer::CommittedModel;
use crate::llm::InvokeError;
use crate::metrics::{AgentOutcome, Metrics, ModelOperation};
use std::fmt;
use std::time::{Duration, Instant};

/// Persona and safety instruction sent ahead of every question
///
/// Content instruction only; the model's compliance is not checked.
pub const SYSTEM_INSTRUCTION: &str = "Você é um assistente virtual de banco amigável, prestativo e seguro. \
Responda às perguntas do cliente. Seja conciso e profissional. \
Não divulgue informações confidenciais ou sensíveis.";

/// Returned to the caller whenever the model call fails
pub const SAFE_ERROR_MESSAGE: &str =
    "Desculpe, houve um erro interno ao processar sua solicitação.";

/// Build the full prompt for a customer question
pub fn compose_prompt(question: &str) -> String {
    format!(
        "Instrução: {}\n\nPergunta do Cliente: {}",
        SYSTEM_INSTRUCTION, question
    )
}

/// Answers customer questions with the committed model
///
/// Holds only read-only state, so one instance is shared by all requests
/// without locking.
pub struct Responder {
    committed: CommittedModel,
    timeout: Duration,
    metrics: Option<Metrics>,
}

impl Responder {
    pub fn new(committed: CommittedModel, timeout: Duration) -> Self {
        Self {
            committed,
            timeout,
            metrics: None,
        }
    }

    /// Record request outcomes and latency
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Identifier of the model answering questions
    pub fn model_id(&self) -> &str {
        self.committed.candidate().as_str()
    }

    /// How long the startup probe of the committed model took
    pub fn probe_latency(&self) -> Duration {
        self.committed.probe_latency()
    }

    /// Ask the model, keeping the failure category
    pub async fn answer(&self, question: &str) -> Result<String, InvokeError> {
        let prompt = compose_prompt(question);
        let start = Instant::now();

        let result = tokio::time::timeout(self.timeout, self.committed.model().invoke(&prompt))
            .await
            .map_err(|_elapsed| InvokeError::Timeout)
            .and_then(|inner| inner);

        if let Some(metrics) = &self.metrics {
            metrics.record_model_latency(
                ModelOperation::Respond,
                start.elapsed().as_secs_f64() * 1000.0,
            );
        }

        result
    }

    /// Ask the model; any failure becomes [`SAFE_ERROR_MESSAGE`]
    ///
    /// The underlying error is logged for operators and never included in
    /// the returned text.
    pub async fn respond(&self, question: &str) -> String {
        let (text, outcome) = match self.answer(question).await {
            Ok(text) => (text, AgentOutcome::Answered),
            Err(e) => {
                tracing::error!(
                    model = %self.committed.candidate(),
                    error_kind = e.kind(),
                    error = %e,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Model invocation failed, returning safe message"
                );
                (SAFE_ERROR_MESSAGE.to_string(), AgentOutcome::Fallback)
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_agent_request(outcome);
        }

        text
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("committed", &self.committed)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
