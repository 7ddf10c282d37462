//! agentbank HTTP server
//!
//! Picks a model at startup, then serves the bank API with Axum.

use agentbank::{
    agent::{InitializationOutcome, ModelInitializer, Responder},
    cli::{Cli, Command, generate_config_template},
    config::Config,
    customers::CustomerStore,
    error::AppError,
    handlers::{self, AppState},
    llm::GeminiConnector,
    metrics::Metrics,
    telemetry,
};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Some(Command::Config { output }) = &cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(path, template)?;
                println!("Configuration template written to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    let config = Config::from_file(&cli.config)?;

    telemetry::init(&config.observability.log_level);

    let provider = &config.provider;
    let connector = GeminiConnector::new(
        provider.base_url(),
        provider.temperature(),
        provider.probe_timeout(),
    )?;

    if let Some(Command::ListModels) = &cli.command {
        let api_key = provider.api_key_from_env().ok_or_else(|| {
            AppError::Config(format!(
                "API key not found. Set {} in the environment or in .env",
                provider.api_key_env()
            ))
        })?;
        let models = connector
            .list_models(&api_key, provider.request_timeout())
            .await
            .map_err(|e| AppError::Internal(format!("Failed to list models: {}", e)))?;
        println!("Models available to this key:");
        for model in models {
            println!("- {}", model);
        }
        return Ok(());
    }

    tracing::info!(
        "Starting agentbank server on {}:{}",
        config.server.host,
        config.server.port
    );

    let metrics = Metrics::new()?;

    let customers = match &config.data.customers_file {
        Some(path) => CustomerStore::from_json_file(path)?,
        None => CustomerStore::sample(),
    };
    tracing::info!(customers = customers.len(), "Customer data loaded");

    let initializer = ModelInitializer::new(
        Arc::new(connector),
        provider.probe_prompt(),
        provider.probe_timeout(),
    )
    .with_metrics(metrics.clone());

    let api_key = provider.api_key_from_env();
    let responder = match initializer
        .initialize(
            api_key.as_deref(),
            provider.api_key_env(),
            provider.candidates(),
        )
        .await
    {
        InitializationOutcome::Ready(committed) => Some(
            Responder::new(committed, provider.request_timeout()).with_metrics(metrics.clone()),
        ),
        InitializationOutcome::Failed(e) => {
            tracing::error!(
                error = %e,
                "LLM initialization failed; /agente will answer 503 until restart"
            );
            None
        }
    };

    let state = AppState::new(customers, responder, metrics);
    let app = handlers::router(state);

    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| std::net::IpAddr::from([0, 0, 0, 0])),
        config.server.port,
    ));

    tracing::info!("Listening on {}", addr);
    tracing::info!("Health check available at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
