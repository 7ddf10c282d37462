//! HTTP request handlers for the agentbank API

use crate::agent::Responder;
use crate::customers::CustomerStore;
use crate::metrics::Metrics;
use crate::middleware::request_id_middleware;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod agent;
pub mod customers;
pub mod extractor;
pub mod health;
pub mod intent;
pub mod metrics;
pub mod root;

/// Application state shared across all handlers
///
/// Built once at startup and read-only afterwards. Cheap to clone across
/// Axum handlers.
#[derive(Clone)]
pub struct AppState {
    customers: Arc<CustomerStore>,
    responder: Option<Arc<Responder>>,
    metrics: Metrics,
}

impl AppState {
    /// Create the state
    ///
    /// `responder` is `None` when no model could be committed at startup;
    /// the conversational route then answers 503 while every other route
    /// keeps working.
    pub fn new(
        customers: CustomerStore,
        responder: Option<Responder>,
        metrics: Metrics,
    ) -> Self {
        Self {
            customers: Arc::new(customers),
            responder: responder.map(Arc::new),
            metrics,
        }
    }

    /// Get reference to the customer store
    pub fn customers(&self) -> &CustomerStore {
        &self.customers
    }

    /// The conversational responder, if a model was committed
    pub fn responder(&self) -> Option<&Responder> {
        self.responder.as_deref()
    }

    /// Get reference to the metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Build the full route table
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root::handler))
        .route("/health", get(health::handler))
        .route("/metrics", get(metrics::handler))
        .route("/agente", post(agent::handler))
        .route("/intencao", post(intent::handler))
        .route("/clientes/{cpf}", get(customers::get_customer))
        .route("/clientes/{cpf}/saldo", get(customers::get_balance))
        .route(
            "/clientes/{cpf}/contas/{conta_id}",
            get(customers::get_account),
        )
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
