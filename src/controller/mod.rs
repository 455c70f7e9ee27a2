//! Controller service
//!
//! Accepts capture requests from clients and drives the recorder:
//! - POST /start_recording - Normalize a request and dispatch it
//! - POST /confirm_recording - Recorder reports a capture outcome
//! - GET/POST /settings - Read or merge the capture settings
//! - GET /sessions - List tracked sessions
//! - GET /sessions/:filename - Query one session
//! - GET /health - Health check

mod client;
mod handlers;
mod routes;
mod state;

pub use client::RecorderClient;
pub use handlers::SessionsResponse;
pub use routes::create_router;
pub use state::ControllerState;
