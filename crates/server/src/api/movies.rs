//! Movie listing handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use hashistream_core::{CategorizedMovies, MovieRecord};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MoviesResponse {
    pub success: bool,
    pub count: usize,
    pub movies: Vec<MovieRecord>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: CategorizedMovies,
}

/// Error body shared by the JSON endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

async fn ensure_loaded(state: &AppState) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    state.orchestrator().ensure_loaded().await.map(|_| ()).map_err(|e| {
        error!(error = %e, "Failed to load movies");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
    })
}

/// GET /api/movies
pub async fn list_movies(State(state): State<Arc<AppState>>) -> ApiResult<MoviesResponse> {
    ensure_loaded(&state).await?;
    let movies = state.cache().snapshot().await;
    Ok(Json(MoviesResponse {
        success: true,
        count: movies.len(),
        movies,
    }))
}

/// GET /api/categories
pub async fn list_categories(State(state): State<Arc<AppState>>) -> ApiResult<CategoriesResponse> {
    ensure_loaded(&state).await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories: state.cache().categorized().await,
    }))
}
