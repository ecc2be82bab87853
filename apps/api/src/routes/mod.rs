pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::view::handlers;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::handle_index))
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/analysis",
            get(handlers::handle_get_view).post(handlers::handle_upload),
        )
        .route("/api/v1/analysis/reset", post(handlers::handle_reset))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
