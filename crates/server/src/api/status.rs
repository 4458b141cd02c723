//! Orchestrator status and refresh handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use hashistream_core::OrchestratorStatus;

use super::movies::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(flatten)]
    pub status: OrchestratorStatus,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub count: usize,
}

/// GET /api/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        success: true,
        status: state.orchestrator().status().await,
    })
}

/// POST /api/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.orchestrator().refresh().await {
        Ok(count) => Ok(Json(RefreshResponse {
            success: true,
            count,
        })),
        Err(e) => {
            warn!(error = %e, "Refresh failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            ))
        }
    }
}
