use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::{handlers, middleware::metrics_middleware, movies, proxy, status, video};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config().server.static_dir.clone();

    // API routes
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Movies
        .route("/movies", get(movies::list_movies))
        .route("/categories", get(movies::list_categories))
        // Playback
        .route("/video", post(video::resolve_video))
        .route("/proxy", get(proxy::proxy))
        // Scrape lifecycle
        .route("/status", get(status::get_status))
        .route("/refresh", post(status::refresh));

    // Front-end with index fallback
    let serve_dir =
        ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .fallback_service(serve_dir)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
