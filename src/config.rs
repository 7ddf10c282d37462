//! Configuration management for agentbank
//!
//! Parses TOML configuration files and provides typed access to settings.

use crate::error::{AppError, AppResult};
use crate::llm::ModelCandidate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for every configured timeout, in seconds
const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// LLM provider configuration
///
/// Fields are private so that a validated config cannot be mutated afterwards.
/// Construct through deserialization or `ProviderConfig::default()`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    base_url: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    api_key_env: String,
    /// Models to probe at startup, most preferred first
    #[serde(default = "default_candidates")]
    candidates: Vec<ModelCandidate>,
    #[serde(default)]
    temperature: f64,
    #[serde(default = "default_probe_prompt")]
    probe_prompt: String,
    #[serde(default = "default_probe_timeout")]
    probe_timeout_seconds: u64,
    #[serde(default = "default_request_timeout")]
    request_timeout_seconds: u64,
}

impl ProviderConfig {
    /// Get the provider base URL (without the `/v1beta` suffix)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the name of the environment variable carrying the API key
    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    /// Get the candidate models in priority order
    pub fn candidates(&self) -> &[ModelCandidate] {
        &self.candidates
    }

    /// Get the sampling temperature used for every model client
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Get the prompt sent as the startup liveness probe
    pub fn probe_prompt(&self) -> &str {
        &self.probe_prompt
    }

    /// Timeout applied to each candidate probe
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    /// Timeout applied to each conversational request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Read the API key from the configured environment variable
    ///
    /// Returns `None` when the variable is unset or blank.
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            candidates: default_candidates(),
            temperature: 0.0,
            probe_prompt: default_probe_prompt(),
            probe_timeout_seconds: default_probe_timeout(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_candidates() -> Vec<ModelCandidate> {
    [
        "gemini-2.5-flash",
        "gemini-1.5-flash",
        "gemini-1.5-pro",
        "gemini-1.0-pro",
    ]
    .into_iter()
    .map(ModelCandidate::from)
    .collect()
}

fn default_probe_prompt() -> String {
    "Olá".to_string()
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

/// Customer data configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DataConfig {
    /// Optional JSON seed file; the built-in sample data is used when absent
    #[serde(default)]
    pub customers_file: Option<PathBuf>,
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            })?;

        let config: Self =
            toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;

        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Validate configuration after parsing
    ///
    /// Called by `from_file()` and `from_str()`; call it explicitly when
    /// building a `Config` by other means.
    pub fn validate(&self) -> AppResult<()> {
        if self.server.host.trim().is_empty() {
            return Err(AppError::Config("server.host cannot be empty".to_string()));
        }

        let provider = &self.provider;

        if !provider.base_url.starts_with("http://") && !provider.base_url.starts_with("https://")
        {
            return Err(AppError::Config(format!(
                "provider.base_url '{}' must start with 'http://' or 'https://'",
                provider.base_url
            )));
        }

        if provider.api_key_env.trim().is_empty() {
            return Err(AppError::Config(
                "provider.api_key_env cannot be empty".to_string(),
            ));
        }

        // An empty list is allowed: startup then reports that no model is available.
        let mut seen = HashSet::new();
        for candidate in &provider.candidates {
            if candidate.as_str().trim().is_empty() {
                return Err(AppError::Config(
                    "provider.candidates cannot contain empty model names".to_string(),
                ));
            }
            if !seen.insert(candidate.as_str()) {
                return Err(AppError::Config(format!(
                    "provider.candidates lists '{}' more than once",
                    candidate
                )));
            }
        }

        if !provider.temperature.is_finite()
            || provider.temperature < 0.0
            || provider.temperature > 2.0
        {
            return Err(AppError::Config(format!(
                "provider.temperature must be a finite number between 0.0 and 2.0, got {}",
                provider.temperature
            )));
        }

        if provider.probe_prompt.trim().is_empty() {
            return Err(AppError::Config(
                "provider.probe_prompt cannot be empty".to_string(),
            ));
        }

        for (name, value) in [
            ("provider.probe_timeout_seconds", provider.probe_timeout_seconds),
            (
                "provider.request_timeout_seconds",
                provider.request_timeout_seconds,
            ),
        ] {
            if value == 0 {
                return Err(AppError::Config(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
            if value > MAX_TIMEOUT_SECONDS {
                return Err(AppError::Config(format!(
                    "{} cannot exceed {} seconds, got {}",
                    name, MAX_TIMEOUT_SECONDS, value
                )));
            }
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config =
            toml::from_str(toml_str).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 8000

[provider]
base_url = "https://generativelanguage.googleapis.com"
api_key_env = "BANK_TEST_KEY"
candidates = ["gemini-2.5-flash", "gemini-1.5-flash"]
temperature = 0.0
probe_prompt = "Olá"
probe_timeout_seconds = 5
request_timeout_seconds = 20

[observability]
log_level = "debug"
"#;

    const MINIMAL_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8000
"#;

    #[test]
    fn test_config_from_str_parses_successfully() {
        let config = Config::from_str(TEST_CONFIG).expect("should parse config");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.provider.api_key_env(), "BANK_TEST_KEY");
        assert_eq!(config.provider.probe_timeout(), Duration::from_secs(5));
        assert_eq!(config.provider.request_timeout(), Duration::from_secs(20));
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_candidates_keep_declared_order() {
        let config = Config::from_str(TEST_CONFIG).expect("should parse config");
        let names: Vec<&str> = config
            .provider
            .candidates()
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(names, vec!["gemini-2.5-flash", "gemini-1.5-flash"]);
    }

    #[test]
    fn test_minimal_config_uses_provider_defaults() {
        let config = Config::from_str(MINIMAL_CONFIG).expect("should parse config");
        assert_eq!(config.provider.api_key_env(), "GOOGLE_API_KEY");
        assert_eq!(config.provider.candidates().len(), 4);
        assert_eq!(config.provider.candidates()[0].as_str(), "gemini-2.5-flash");
        assert_eq!(config.provider.temperature(), 0.0);
        assert_eq!(config.provider.probe_prompt(), "Olá");
        assert!(config.data.customers_file.is_none());
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_empty_candidate_list_is_accepted() {
        let toml = format!("{}\n[provider]\ncandidates = []\n", MINIMAL_CONFIG);
        let config = Config::from_str(&toml).expect("empty candidate list is valid");
        assert!(config.provider.candidates().is_empty());
    }

    #[test]
    fn test_duplicate_candidates_are_rejected() {
        let toml = format!(
            "{}\n[provider]\ncandidates = [\"gemini-1.5-pro\", \"gemini-1.5-pro\"]\n",
            MINIMAL_CONFIG
        );
        let err = Config::from_str(&toml).expect_err("duplicates should fail");
        assert!(err.to_string().contains("more than once"), "got: {}", err);
    }

    #[test]
    fn test_blank_candidate_is_rejected() {
        let toml = format!("{}\n[provider]\ncandidates = [\"  \"]\n", MINIMAL_CONFIG);
        assert!(Config::from_str(&toml).is_err());
    }

    #[test]
    fn test_temperature_out_of_range_is_rejected() {
        let toml = format!("{}\n[provider]\ntemperature = 2.5\n", MINIMAL_CONFIG);
        let err = Config::from_str(&toml).expect_err("temperature 2.5 should fail");
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let toml = format!("{}\n[provider]\nprobe_timeout_seconds = 0\n", MINIMAL_CONFIG);
        let err = Config::from_str(&toml).expect_err("zero timeout should fail");
        assert!(err.to_string().contains("probe_timeout_seconds"));
    }

    #[test]
    fn test_excessive_timeout_is_rejected() {
        let toml = format!(
            "{}\n[provider]\nrequest_timeout_seconds = 301\n",
            MINIMAL_CONFIG
        );
        let err = Config::from_str(&toml).expect_err("301s should fail");
        assert!(err.to_string().contains("cannot exceed 300"));
    }

    #[test]
    fn test_base_url_without_scheme_is_rejected() {
        let toml = format!(
            "{}\n[provider]\nbase_url = \"generativelanguage.googleapis.com\"\n",
            MINIMAL_CONFIG
        );
        assert!(Config::from_str(&toml).is_err());
    }

    #[test]
    fn test_parse_error_reports_string_source() {
        let err = Config::from_str("[server\nhost=").expect_err("invalid TOML");
        assert!(matches!(err, AppError::ConfigParseFailed { ref path, .. } if path == "<string>"));
    }
}
