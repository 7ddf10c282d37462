//! Conversational core
//!
//! [`initializer`] selects a model once at startup; [`responder`] answers
//! questions with it for the rest of the process lifetime.

pub mod initializer;
pub mod responder;

pub use initializer::{
    CommittedModel, InitError, InitializationOutcome, ModelInitializer, ProbeFailure,
};
pub use responder::{Responder, SAFE_ERROR_MESSAGE, SYSTEM_INSTRUCTION, compose_prompt};
