mod classify;
mod config;
mod errors;
mod jira;
mod llm_client;
mod routes;
mod state;
mod suggestions;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::classify::{pipeline::load_classifier, Criterion};
use crate::config::Config;
use crate::jira::JiraClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting StoryLint API v{}", env!("CARGO_PKG_VERSION"));

    // Load encoder + classifier pairs; a missing or broken artifact aborts startup
    info!("Loading models from {}", config.model_dir.display());
    let well_formed = load_classifier(
        &config.model_dir,
        Criterion::WellFormed,
        config.max_sequence_length,
    )
    .context("Model loading failed. Please check the model paths and files.")?;
    let ambiguity = load_classifier(
        &config.model_dir,
        Criterion::Ambiguity,
        config.max_sequence_length,
    )
    .context("Model loading failed. Please check the model paths and files.")?;

    // Initialize LLM backend
    let llm = llm_client::from_provider(&config.llm)?;
    info!("LLM client initialized (model: {})", llm.model());

    let jira = JiraClient::new()?;

    // Build app state
    let state = AppState {
        well_formed: Arc::new(well_formed),
        ambiguity: Arc::new(ambiguity),
        llm,
        jira: Arc::new(jira),
        jira_defaults: config.jira.clone(),
    };

    // Build router; the browser frontend is served from another origin
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
