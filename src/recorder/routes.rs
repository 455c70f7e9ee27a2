use super::handlers;
use super::state::RecorderState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the recorder router with all routes
pub fn create_router(state: RecorderState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/initiate_recording", post(handlers::initiate_recording))
        .route("/captures", get(handlers::list_captures))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
