//! Language model abstraction
//!
//! The conversational core talks to remote models only through the
//! [`LanguageModel`] and [`ModelConnector`] traits. The Gemini REST client is
//! the production implementation; tests inject fakes.

pub mod candidate;
pub mod gemini;

pub use candidate::ModelCandidate;
pub use gemini::{GeminiClient, GeminiConnector};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Categorized failure of a single model invocation
///
/// Callers currently treat every variant the same way (probe fallback or the
/// safe user-facing message), but the categories are kept distinct so that
/// finer handling stays possible.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("authentication rejected (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("quota exceeded: {0}")]
    Quota(String),

    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("provider error (HTTP {status}): {message}")]
    Provider { status: u16, message: String },
}

impl InvokeError {
    /// Short, bounded label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout => "timeout",
            Self::Auth { .. } => "auth",
            Self::Quota(_) => "quota",
            Self::UnknownModel(_) => "unknown_model",
            Self::Malformed(_) => "malformed",
            Self::Provider { .. } => "provider",
        }
    }
}

/// A handle to one remote model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Identifier of the model this handle is bound to
    fn model_id(&self) -> &str;

    /// Send a single prompt and return the model's text output
    async fn invoke(&self, prompt: &str) -> Result<String, InvokeError>;
}

/// Builds model handles bound to a candidate and credential
pub trait ModelConnector: Send + Sync {
    fn connect(
        &self,
        candidate: &ModelCandidate,
        api_key: &str,
    ) -> Result<Arc<dyn LanguageModel>, InvokeError>;
}
