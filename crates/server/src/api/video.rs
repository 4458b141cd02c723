//! On-demand video lookup handler.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VideoRequest {
    #[serde(rename = "movieUrl")]
    pub movie_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub success: bool,
    #[serde(rename = "videoUrl", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/video
///
/// Lookup failures answer 200 with `success: false`; only a missing URL is
/// a client error.
pub async fn resolve_video(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VideoRequest>,
) -> (StatusCode, Json<VideoResponse>) {
    let Some(url) = body.movie_url.filter(|u| !u.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(VideoResponse {
                success: false,
                video_url: None,
                error: Some("movieUrl is required".to_string()),
            }),
        );
    };

    let response = match state.video().resolve(url.trim()).await {
        Ok(video_url) => VideoResponse {
            success: true,
            video_url: Some(video_url),
            error: None,
        },
        Err(e) => VideoResponse {
            success: false,
            video_url: None,
            error: Some(e.to_string()),
        },
    };
    (StatusCode::OK, Json(response))
}
