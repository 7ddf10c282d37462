//! Command-line interface for agentbank
//!
//! Provides argument parsing and subcommand handling for the agentbank binary.

use clap::{Parser, Subcommand};

/// Simulated bank API with an LLM-backed assistant
#[derive(Parser)]
#[command(name = "agentbank")]
#[command(version)]
#[command(about = "Simulated bank API with an LLM-backed assistant")]
#[command(
    long_about = "agentbank serves simulated customer data and keyword intent \
    classification over HTTP, and answers free-text questions with the first \
    Gemini model that responds to a startup probe."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List the models the configured API key can access, then exit
    ListModels,
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# agentbank Configuration
# =======================

# ─────────────────────────────────────────────────────────────────────────────
# SERVER
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"
port = 8000

# ─────────────────────────────────────────────────────────────────────────────
# LLM PROVIDER
# ─────────────────────────────────────────────────────────────────────────────
#
# Candidates are probed once at startup, in order. The first one that answers
# the probe prompt serves every /agente request until the process exits.
# If none answers, /agente returns 503 and every other route keeps working.

[provider]
base_url = "https://generativelanguage.googleapis.com"

# Environment variable holding the API key (a .env file is also read)
api_key_env = "GOOGLE_API_KEY"

candidates = [
    "gemini-2.5-flash",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-1.0-pro",
]

# Sampling temperature (0.0-2.0)
temperature = 0.0

probe_prompt = "Olá"
probe_timeout_seconds = 10
request_timeout_seconds = 30

# ─────────────────────────────────────────────────────────────────────────────
# CUSTOMER DATA
# ─────────────────────────────────────────────────────────────────────────────

[data]
# JSON object keyed by CPF. Built-in sample data is used when omitted.
# customers_file = "clientes.json"

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
log_level = "info"

# Prometheus metrics are always available at /metrics on the server port
"#
}
