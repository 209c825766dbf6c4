pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

/// Largest accepted request body: a 10 MiB resume plus form overhead.
const MAX_REQUEST_BYTES: usize = 12 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening API
        .route("/api/v1/roles", get(handlers::handle_list_roles))
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}
