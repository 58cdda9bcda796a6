//! Health check endpoints
//!
//! - /api/health - Service version and uptime
//! - /api/health/ready - Readiness probe (checks the database)
//! - /api/health/live - Liveness probe (always OK while the process runs)

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use items_api_shared::types::{ApiResponse, HealthInfo};
use serde::Serialize;

/// Probe response
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<CheckStatus>,
}

/// Status of an individual check
#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthInfo>> {
    Json(ApiResponse::with_message(
        HealthInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.started_at.elapsed().as_secs(),
        },
        "Service is healthy",
    ))
}

/// Readiness probe, 503 while the database is unreachable
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ProbeResponse>, (StatusCode, Json<ProbeResponse>)> {
    let database = match db::health_check(state.db()).await {
        Ok(()) => CheckStatus {
            status: "healthy".to_string(),
            message: None,
        },
        Err(e) => CheckStatus {
            status: "unhealthy".to_string(),
            message: Some(e.to_string()),
        },
    };

    let is_healthy = database.status == "healthy";

    let response = ProbeResponse {
        status: if is_healthy { "ready" } else { "not_ready" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: Some(database),
    };

    if is_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Liveness probe
pub async fn liveness_check() -> Json<ProbeResponse> {
    Json(ProbeResponse {
        status: "alive".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: None,
    })
}
