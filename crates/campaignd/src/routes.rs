//! API routes for campaignd

use crate::error::ResearchError;
use crate::server::{AppState, MAX_BODY_SIZE};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use campaign_common::{ResearchRequest, ResearchResponse};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

type AppStateArc = Arc<AppState>;

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub port: u16,
    pub version: String,
    pub uptime_seconds: u64,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health_check))
}

async fn liveness() -> &'static str {
    "Campaign research gateway is running"
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        port: state.port,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Research Routes
// ============================================================================

pub fn research_routes() -> Router<AppStateArc> {
    Router::new().route("/api/research", post(run_research))
}

async fn run_research(
    State(state): State<AppStateArc>,
    payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Json<ResearchResponse>, ResearchError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("  Rejected research body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ResearchError::PayloadTooLarge(MAX_BODY_SIZE)
        } else {
            ResearchError::InvalidInput(rejection.body_text())
        }
    })?;

    // Detached so a disconnecting caller does not cancel the completion call
    let research = state.research.clone();
    let outcome = tokio::spawn(async move { research.run(request).await })
        .await
        .map_err(|e| ResearchError::Internal(anyhow::anyhow!("research task failed: {}", e)))?;

    match outcome {
        Ok(campaign_research_result) => {
            info!("  Research request completed");
            Ok(Json(ResearchResponse {
                campaign_research_result,
            }))
        }
        Err(e) => {
            match &e {
                e if e.is_client_error() => warn!("  Research request rejected: {}", e),
                ResearchError::UpstreamFormat(_) => warn!("  Research request failed: {}", e),
                _ => error!("  Research request failed: {:#}", e),
            }
            Err(e)
        }
    }
}
