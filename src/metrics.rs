//! Prometheus metrics collection for agentbank
//!
//! Tracks:
//! - Startup probe attempts by outcome
//! - Conversational requests by outcome
//! - Intent classifications by label
//! - Model call latency by operation
//!
//! Exposed via the `/metrics` endpoint in Prometheus text format.

use crate::intent::IntentLabel;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Result of a single startup probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success,
    Failure,
}

impl ProbeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeOutcome::Success => "success",
            ProbeOutcome::Failure => "failure",
        }
    }
}

/// Result of a `POST /agente` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentOutcome {
    /// The model answered
    Answered,
    /// The model call failed and the safe message was returned
    Fallback,
    /// No model was committed at startup
    Unavailable,
}

impl AgentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentOutcome::Answered => "answered",
            AgentOutcome::Fallback => "fallback",
            AgentOutcome::Unavailable => "unavailable",
        }
    }
}

/// Which kind of model call a latency sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOperation {
    Probe,
    Respond,
}

impl ModelOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelOperation::Probe => "probe",
            ModelOperation::Respond => "respond",
        }
    }
}

/// Metrics collector
///
/// All label values come from closed enums, so cardinality is fixed.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    probe_attempts: IntCounterVec,
    agent_requests: IntCounterVec,
    intent_classifications: IntCounterVec,
    model_latency: HistogramVec,
}

impl Metrics {
    /// Create a new Metrics instance with its own registry
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let probe_attempts = IntCounterVec::new(
            Opts::new(
                "agentbank_probe_attempts_total",
                "Startup liveness probes by outcome",
            ),
            &["outcome"],
        )?;

        let agent_requests = IntCounterVec::new(
            Opts::new(
                "agentbank_agent_requests_total",
                "Conversational requests by outcome",
            ),
            &["outcome"],
        )?;

        let intent_classifications = IntCounterVec::new(
            Opts::new(
                "agentbank_intent_classifications_total",
                "Intent classifications by label",
            ),
            &["intent"],
        )?;

        let model_latency = HistogramVec::new(
            HistogramOpts::new(
                "agentbank_model_latency_ms",
                "Model call latency in milliseconds",
            )
            .buckets(vec![
                50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0,
            ]),
            &["operation"],
        )?;

        registry.register(Box::new(probe_attempts.clone()))?;
        registry.register(Box::new(agent_requests.clone()))?;
        registry.register(Box::new(intent_classifications.clone()))?;
        registry.register(Box::new(model_latency.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            probe_attempts,
            agent_requests,
            intent_classifications,
            model_latency,
        })
    }

    pub fn record_probe(&self, outcome: ProbeOutcome) {
        self.probe_attempts
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    pub fn record_agent_request(&self, outcome: AgentOutcome) {
        self.agent_requests
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    pub fn record_intent(&self, intent: IntentLabel) {
        self.intent_classifications
            .with_label_values(&[intent.as_str()])
            .inc();
    }

    /// Record a model call duration
    ///
    /// Non-finite or negative durations are dropped with a warning; they
    /// would poison every histogram percentile.
    pub fn record_model_latency(&self, operation: ModelOperation, duration_ms: f64) {
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            tracing::warn!(
                operation = operation.as_str(),
                duration_ms = duration_ms,
                "Dropping invalid latency sample"
            );
            return;
        }
        self.model_latency
            .with_label_values(&[operation.as_str()])
            .observe(duration_ms);
    }

    pub fn agent_requests_count(&self, outcome: AgentOutcome) -> u64 {
        self.agent_requests
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    pub fn probe_count(&self, outcome: ProbeOutcome) -> u64 {
        self.probe_attempts
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    pub fn intent_count(&self, intent: IntentLabel) -> u64 {
        self.intent_classifications
            .with_label_values(&[intent.as_str()])
            .get()
    }

    /// Encode all metrics in Prometheus text exposition format
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!("Metrics output is not valid UTF-8: {}", e))
        })
    }
}
