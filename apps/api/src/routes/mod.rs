pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ingest::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // CSV import
        .route(
            "/api/v1/imports/preview",
            post(handlers::handle_preview).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/imports/map", post(handlers::handle_map))
        .route(
            "/api/v1/imports",
            post(handlers::handle_import)
                .get(handlers::handle_list_imports)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Dashboard data
        .route(
            "/api/v1/posts/:x_post_id/snapshots",
            get(handlers::handle_post_snapshots),
        )
        .route(
            "/api/v1/recompute/runs",
            get(handlers::handle_recompute_runs),
        )
        .with_state(state)
}
