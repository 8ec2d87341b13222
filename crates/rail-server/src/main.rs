//! Railbank Server - REST API for the guardrailed banking assistant
//!
//! Loads the guardrail pipeline document at startup and exposes the
//! combined pipeline plus a single-check demo endpoint. A pipeline
//! document that fails to load or references unknown checks is fatal:
//! the process refuses to serve rather than run a partial pipeline.

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use rail_checks::{builtin, CheckRegistry, ValidatorEngine};
use rail_core::{init_logging, load_config_or_default};
use rail_llm::OpenAIClient;
use rail_pipeline::{PipelineConfig, PipelineOrchestrator};

mod handlers;
mod models;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("RAIL_CONFIG").unwrap_or_else(|_| "rail.toml".to_string());
    let config = load_config_or_default(&config_path);

    init_logging(&config.logging);

    let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");

    // The pipeline document is mandatory; refuse to serve without it
    let pipeline = Arc::new(PipelineConfig::from_path(&config.pipeline.config_path)?);

    // Check registry: all built-ins against one engine client
    let engine = Arc::new(ValidatorEngine::new(&config.engine.base_url));
    let mut registry = CheckRegistry::new();
    builtin::register_builtins(&mut registry, engine);
    let registry = Arc::new(registry);

    let model = Arc::new(OpenAIClient::new(api_key, &config.model.model)?);

    let orchestrator = Arc::new(
        PipelineOrchestrator::new(pipeline.clone(), registry.clone(), model)?
            .with_temperature(config.model.temperature),
    );

    let state = AppState::new(orchestrator, registry, pipeline);

    let app = Router::new()
        .route("/", get(handlers::health))
        .route("/api/v1/guardrail/combined/ask", post(handlers::combined_ask))
        .route("/api/v1/guardrail/check/:name", post(handlers::single_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("Railbank server listening on http://{}", addr);
    tracing::info!("  GET  / - health");
    tracing::info!("  POST /api/v1/guardrail/combined/ask - combined pipeline");
    tracing::info!("  POST /api/v1/guardrail/check/:name - single check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
