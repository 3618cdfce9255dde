//! HTTP API gateway for Strata.
//!
//! Exposes REST endpoints for the tiered-memory operations:
//!
//! - `GET  /health`                                — status + version
//! - `GET  /v1/users/{user_id}/layers`             — all five layers with budgets
//! - `POST /v1/users/{user_id}/session-end`        — process a completed session
//! - `POST /v1/users/{user_id}/promote`            — merge a fact into layer 3–5
//! - `PUT  /v1/users/{user_id}/layers/{layer_num}` — direct overwrite, no LLM
//! - `POST /v1/users/{user_id}/style`              — run the style analyzer
//! - `GET  /v1/users/{user_id}/context`            — assembled context block
//!
//! Built on Axum. Transport framing ends here — everything behind the
//! handlers is the engine's concern.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use strata_engine::MemoryEngine;
use tracing::info;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub engine: Arc<MemoryEngine>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the full router: health plus the nested v1 API.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api::v1_router(state))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Builds the store and summarizer from config once and shares them via
/// the engine.
pub async fn start(config: strata_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let host = config.gateway.host.clone();
    let port = config.gateway.port;
    let addr = format!("{host}:{port}");

    let store: Arc<dyn strata_core::LayerStore> = match config.store.backend.as_str() {
        "memory" => Arc::new(strata_store::InMemoryStore::new()),
        _ => {
            let path = config.sqlite_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Arc::new(strata_store::SqliteStore::new(&path.display().to_string()).await?)
        }
    };

    let summarizer = strata_summarizer::build_from_config(&config)?;
    let engine = Arc::new(MemoryEngine::from_config(&config.engine, store, summarizer));

    let state = Arc::new(GatewayState { engine });
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
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
