//! Google Gemini REST client
//!
//! Talks to the `generateContent` and `models` endpoints of the Generative
//! Language API over `reqwest`. The API key travels in the `x-goog-api-key`
//! header and is never logged.

use super::{InvokeError, LanguageModel, ModelCandidate, ModelConnector};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";
const API_VERSION: &str = "v1beta";

/// Upper bound on pages fetched by [`GeminiConnector::list_models`]
pub const MAX_MODEL_PAGES: usize = 100;

/// Client bound to a single Gemini model
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: ModelCandidate,
    api_key: String,
    temperature: f64,
}

impl GeminiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        model: ModelCandidate,
        api_key: &str,
        temperature: f64,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key: api_key.to_string(),
            temperature,
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, API_VERSION, self.model
        )
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    async fn invoke(&self, prompt: &str) -> Result<String, InvokeError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![OutgoingPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        tracing::debug!(
            model = %self.model,
            prompt_length = prompt.len(),
            "Sending generateContent request"
        );

        let response = self
            .http
            .post(self.generate_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &text, self.model.as_str()));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| InvokeError::Malformed(e.to_string()))?;

        parsed
            .into_text()
            .ok_or_else(|| InvokeError::Malformed("response contained no text parts".to_string()))
    }
}

/// Builds [`GeminiClient`]s sharing one connection pool
#[derive(Clone)]
pub struct GeminiConnector {
    http: reqwest::Client,
    base_url: String,
    temperature: f64,
}

impl GeminiConnector {
    /// Create a connector for the given API base URL
    ///
    /// `connect_timeout` bounds TCP/TLS setup only. Whole-call timeouts are
    /// applied by the callers of [`LanguageModel::invoke`] and passed to
    /// [`GeminiConnector::list_models`].
    pub fn new(base_url: &str, temperature: f64, connect_timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature,
        })
    }

    /// List the model names available to this API key
    ///
    /// Follows pagination until the provider stops returning a page token.
    /// The `models/` prefix is stripped so names can be pasted into
    /// `provider.candidates` directly.
    ///
    /// `timeout` bounds the whole listing, every page included. A page
    /// token seen twice, or more than [`MAX_MODEL_PAGES`] pages, fails with
    /// [`InvokeError::Malformed`].
    pub async fn list_models(
        &self,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, InvokeError> {
        tokio::time::timeout(timeout, self.fetch_model_pages(api_key))
            .await
            .map_err(|_elapsed| InvokeError::Timeout)?
    }

    async fn fetch_model_pages(&self, api_key: &str) -> Result<Vec<String>, InvokeError> {
        let url = format!("{}/{}/models", self.base_url, API_VERSION);
        let mut names = Vec::new();
        let mut seen_tokens = HashSet::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_MODEL_PAGES {
            let mut request = self.http.get(&url).header(API_KEY_HEADER, api_key);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await.map_err(transport_error)?;
            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(status_error(status, &text, "models"));
            }

            let page: ListModelsResponse = response
                .json()
                .await
                .map_err(|e| InvokeError::Malformed(e.to_string()))?;

            names.extend(page.models.into_iter().map(|m| {
                m.name
                    .strip_prefix("models/")
                    .map(str::to_string)
                    .unwrap_or(m.name)
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => {
                    if !seen_tokens.insert(token.clone()) {
                        return Err(InvokeError::Malformed(format!(
                            "model listing repeated page token '{}'",
                            token
                        )));
                    }
                    page_token = Some(token);
                }
                _ => return Ok(names),
            }
        }

        Err(InvokeError::Malformed(format!(
            "model listing did not finish within {} pages",
            MAX_MODEL_PAGES
        )))
    }
}

impl ModelConnector for GeminiConnector {
    fn connect(
        &self,
        candidate: &ModelCandidate,
        api_key: &str,
    ) -> Result<Arc<dyn LanguageModel>, InvokeError> {
        Ok(Arc::new(GeminiClient::new(
            self.http.clone(),
            &self.base_url,
            candidate.clone(),
            api_key,
            self.temperature,
        )))
    }
}

fn transport_error(e: reqwest::Error) -> InvokeError {
    if e.is_timeout() {
        InvokeError::Timeout
    } else {
        InvokeError::Network(e.to_string())
    }
}

/// Map a non-2xx provider response onto an [`InvokeError`] category
fn status_error(status: StatusCode, body: &str, model: &str) -> InvokeError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => InvokeError::Auth {
            status: status.as_u16(),
            message,
        },
        // The API answers an invalid key with 400 INVALID_ARGUMENT
        StatusCode::BAD_REQUEST if message.contains("API key") => InvokeError::Auth {
            status: status.as_u16(),
            message,
        },
        StatusCode::NOT_FOUND => InvokeError::UnknownModel(format!("{}: {}", model, message)),
        StatusCode::TOO_MANY_REQUESTS => InvokeError::Quota(message),
        _ => InvokeError::Provider {
            status: status.as_u16(),
            message,
        },
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<OutgoingPart<'a>>,
}

#[derive(Serialize)]
struct OutgoingPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<IncomingPart>,
}

#[derive(Deserialize)]
struct IncomingPart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ModelInfo {
    name: String,
}
