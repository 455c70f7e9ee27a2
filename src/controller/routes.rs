use super::handlers;
use super::state::ControllerState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the controller router with all routes
pub fn create_router(state: ControllerState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recording protocol
        .route("/start_recording", post(handlers::start_recording))
        .route("/confirm_recording", post(handlers::confirm_recording))
        // Settings
        .route(
            "/settings",
            get(handlers::get_settings).post(handlers::update_settings),
        )
        // Session queries
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions/:filename", get(handlers::get_session))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
