//! HTTP API gateway for readchat.
//!
//! Serves the embedded single-page UI plus a small JSON API for creating
//! sessions, uploading a reading history CSV and asking questions about it.
//!
//! Built on Axum; every request is handled independently and per-session
//! state lives behind a `tokio::sync::RwLock`.

pub mod api_v1;
pub mod frontend;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use readchat_agent::ReadingAssistant;

pub use api_v1::{GatewayState, SharedState};

/// Uploaded CSVs and question bodies are small; anything past this is refused.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Build the full router: health check, v1 API and the embedded frontend.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(state))
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Builds the provider, conversation memory and assistant once and shares
/// them between all sessions. Fails before binding when no model
/// credential is configured.
pub async fn start(config: readchat_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = readchat_providers::build_from_config(&config)?;
    let history = readchat_memory::build_from_config(&config.memory);
    info!(
        provider = provider.name(),
        model = %config.model,
        memory = history.name(),
        "Assistant ready"
    );

    let assistant = Arc::new(ReadingAssistant::from_config(
        &config,
        provider,
        history.clone(),
    ));
    let state = Arc::new(GatewayState::new(assistant, history));

    let app = build_router(state);

    info!(addr = %addr, "Gateway listening, open http://{addr}/ in a browser");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
