//! Startup model selection with ordered fallback
//!
//! Candidates are probed one at a time, in configuration order. The first
//! candidate whose liveness probe returns without error is committed for the
//! lifetime of the process; later candidates are never contacted.
//!
//! Probing is strictly sequential. Each probe is a real, billed call to the
//! provider.

use crate::llm::{InvokeError, LanguageModel, ModelCandidate, ModelConnector};
use crate::metrics::{Metrics, ModelOperation, ProbeOutcome};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// The model selected at startup
///
/// Cheap to clone; the handle is shared.
#[derive(Clone)]
pub struct CommittedModel {
    candidate: ModelCandidate,
    model: Arc<dyn LanguageModel>,
    probe_latency: Duration,
}

impl CommittedModel {
    /// Commit a model handle directly, without probing
    pub fn new(candidate: ModelCandidate, model: Arc<dyn LanguageModel>) -> Self {
        Self {
            candidate,
            model,
            probe_latency: Duration::ZERO,
        }
    }

    /// Identifier of the committed candidate
    pub fn candidate(&self) -> &ModelCandidate {
        &self.candidate
    }

    /// Handle used to invoke the model
    pub fn model(&self) -> &Arc<dyn LanguageModel> {
        &self.model
    }

    /// How long the successful probe took (informational)
    pub fn probe_latency(&self) -> Duration {
        self.probe_latency
    }
}

impl fmt::Debug for CommittedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommittedModel")
            .field("candidate", &self.candidate)
            .field("probe_latency", &self.probe_latency)
            .finish_non_exhaustive()
    }
}

/// One candidate that failed its probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub candidate: ModelCandidate,
    pub reason: InvokeError,
}

/// Why the conversational surface could not be enabled
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("API key not found. Set {env_var} in the environment or in .env")]
    MissingCredential { env_var: String },

    #[error(
        "No model available: {} candidate(s) failed probing. Check the API key and its permissions.",
        .failures.len()
    )]
    NoModelAvailable { failures: Vec<ProbeFailure> },
}

/// Result of the startup scan
#[derive(Debug)]
pub enum InitializationOutcome {
    Ready(CommittedModel),
    Failed(InitError),
}

impl InitializationOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, InitializationOutcome::Ready(_))
    }

    /// The committed model, if initialization succeeded
    pub fn into_committed(self) -> Option<CommittedModel> {
        match self {
            InitializationOutcome::Ready(committed) => Some(committed),
            InitializationOutcome::Failed(_) => None,
        }
    }
}

/// Runs the ordered probe scan
pub struct ModelInitializer {
    connector: Arc<dyn ModelConnector>,
    probe_prompt: String,
    probe_timeout: Duration,
    metrics: Option<Metrics>,
}

impl ModelInitializer {
    pub fn new(
        connector: Arc<dyn ModelConnector>,
        probe_prompt: impl Into<String>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            connector,
            probe_prompt: probe_prompt.into(),
            probe_timeout,
            metrics: None,
        }
    }

    /// Record probe outcomes and latency
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Probe `candidates` in order and commit the first that answers
    ///
    /// `api_key` is checked before any network traffic: a missing or blank
    /// key fails with [`InitError::MissingCredential`] and nothing is probed.
    /// An empty candidate list fails with [`InitError::NoModelAvailable`].
    pub async fn initialize(
        &self,
        api_key: Option<&str>,
        env_var: &str,
        candidates: &[ModelCandidate],
    ) -> InitializationOutcome {
        let api_key = match api_key.map(str::trim) {
            Some(key) if !key.is_empty() => key,
            _ => {
                return InitializationOutcome::Failed(InitError::MissingCredential {
                    env_var: env_var.to_string(),
                });
            }
        };

        tracing::info!(
            candidate_count = candidates.len(),
            probe_timeout_ms = self.probe_timeout.as_millis() as u64,
            "Probing model candidates"
        );

        let mut failures = Vec::new();

        for (position, candidate) in candidates.iter().enumerate() {
            match self.probe_candidate(candidate, api_key).await {
                Ok((model, latency)) => {
                    tracing::info!(
                        model = %candidate,
                        position = position + 1,
                        probe_latency_ms = latency.as_millis() as u64,
                        skipped = failures.len(),
                        "Model committed (probe latency {:.2}s)",
                        latency.as_secs_f64()
                    );
                    return InitializationOutcome::Ready(CommittedModel {
                        candidate: candidate.clone(),
                        model,
                        probe_latency: latency,
                    });
                }
                Err(reason) => {
                    tracing::warn!(
                        model = %candidate,
                        position = position + 1,
                        error_kind = reason.kind(),
                        error = %reason,
                        "Model unavailable, trying next candidate"
                    );
                    failures.push(ProbeFailure {
                        candidate: candidate.clone(),
                        reason,
                    });
                }
            }
        }

        InitializationOutcome::Failed(InitError::NoModelAvailable { failures })
    }

    async fn probe_candidate(
        &self,
        candidate: &ModelCandidate,
        api_key: &str,
    ) -> Result<(Arc<dyn LanguageModel>, Duration), InvokeError> {
        let result = async {
            let model = self.connector.connect(candidate, api_key)?;

            let start = Instant::now();
            tokio::time::timeout(self.probe_timeout, model.invoke(&self.probe_prompt))
                .await
                .map_err(|_elapsed| InvokeError::Timeout)??;
            let latency = start.elapsed();

            if let Some(metrics) = &self.metrics {
                metrics
                    .record_model_latency(ModelOperation::Probe, latency.as_secs_f64() * 1000.0);
            }
            Ok::<_, InvokeError>((model, latency))
        }
        .await;

        if let Some(metrics) = &self.metrics {
            let outcome = if result.is_ok() {
                ProbeOutcome::Success
            } else {
                ProbeOutcome::Failure
            };
            metrics.record_probe(outcome);
        }

        result
    }
}
