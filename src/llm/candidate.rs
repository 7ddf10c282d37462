//! Type-safe model candidate identifier
//!
//! Candidates are opaque provider model names (e.g. `gemini-2.5-flash`).
//! Their order in configuration is their priority during startup probing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A remote model identifier considered during fallback initialization
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelCandidate(String);

impl ModelCandidate {
    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ModelCandidate {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for ModelCandidate {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl fmt::Display for ModelCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModelCandidate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
