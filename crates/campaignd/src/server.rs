//! HTTP server for campaignd

use crate::config::{Config, ServerConfig};
use crate::research::ResearchService;
use crate::routes;
use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, Router};
use campaign_common::CompletionClient;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Maximum request body size: 64 KiB
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Application state shared across handlers
pub struct AppState {
    pub research: ResearchService,
    /// Port reported by `/health`
    pub port: u16,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(client: Arc<dyn CompletionClient>, config: &Config) -> Self {
        Self {
            research: ResearchService::new(client, &config.llm),
            port: config.server.port,
            start_time: Instant::now(),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::research_routes())
        .with_state(Arc::new(state))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until Ctrl-C
pub async fn run(state: AppState, server: &ServerConfig) -> Result<()> {
    let model = state.research.model().to_string();
    let app = router(state);

    let addr = server.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("  Listening on http://{} (model {})", addr, model);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
