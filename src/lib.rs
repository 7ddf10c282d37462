//! agentbank - simulated bank API with an LLM-backed assistant
//!
//! Serves customer data lookups and keyword intent classification over
//! HTTP, and forwards free-text questions to a hosted Gemini model chosen
//! at startup from an ordered list of candidates.

pub mod agent;
pub mod cli;
pub mod config;
pub mod customers;
pub mod error;
pub mod handlers;
pub mod intent;
pub mod llm;
pub mod metrics;
pub mod middleware;
pub mod telemetry;
