//! Error types for agentbank
//!
//! All errors implement `IntoResponse` for Axum handlers. The response body
//! always has the shape `{"detail": "..."}`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file '{path}': {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in '{path}': {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Failed to load customer data from '{path}': {reason}")]
    CustomerDataLoad { path: String, reason: String },

    /// Request body could not be extracted; carries the status to answer with
    #[error("Invalid request body: {message}")]
    InvalidBody { status: StatusCode, message: String },

    #[error("Cliente não encontrado.")]
    CustomerNotFound { cpf: String },

    #[error("Conta ID '{account_id}' não encontrada para o CPF.")]
    AccountNotFound { cpf: String, account_id: String },

    #[error("Serviço do Agente indisponível. Falha na inicialização do LLM.")]
    AgentUnavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidBody { status, .. } => *status,
            Self::CustomerNotFound { .. } | Self::AccountNotFound { .. } => StatusCode::NOT_FOUND,
            Self::AgentUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. }
            | Self::CustomerDataLoad { .. }
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "detail": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    /// Syntax errors are 400, well-formed bodies of the wrong shape are 422,
    /// a missing JSON content type is 415
    fn from(rejection: JsonRejection) -> Self {
        let (status, message) = match &rejection {
            JsonRejection::JsonSyntaxError(_) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            JsonRejection::JsonDataError(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
            }
            JsonRejection::MissingJsonContentType(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Content-Type must be application/json".to_string(),
            ),
            _ => (StatusCode::BAD_REQUEST, rejection.body_text()),
        };
        Self::InvalidBody { status, message }
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
