//! Axum router configuration with middleware.
//!
//! All routes are under `/api/`. Middleware: CORS, request tracing.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete query API router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions/search", get(handlers::search_sessions))
        .route("/sessions/{id}", get(handlers::get_session))
        .route("/commits", get(handlers::list_commits))
        .route("/commits/search", get(handlers::search_commits))
        .route("/timeline", get(handlers::timeline))
        .route("/stats", get(handlers::stats));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}
