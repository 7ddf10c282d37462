//! JSON extractor with `{"detail": ...}` error bodies
//!
//! Wraps Axum's `Json` extractor so that malformed request bodies are
//! reported in the same shape as every other API error.

use crate::error::AppError;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

/// Drop-in replacement for `axum::Json` in request position
///
/// Rejections become [`AppError::InvalidBody`]: 400 for syntax errors, 422
/// for bodies of the wrong shape, 415 without a JSON content type.
pub struct BankJson<T>(pub T);

impl<S, T> FromRequest<S> for BankJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(BankJson(value)),
            Err(rejection) => Err(AppError::from(rejection)),
        }
    }
}
