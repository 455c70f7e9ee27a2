//! Recorder service
//!
//! Performs captures on behalf of the controller:
//! - POST /initiate_recording - Validate a job, capture it, write the WAV
//! - GET /captures - In-flight captures and their phase
//! - GET /health - Health check
//!
//! Every capture outcome is reported back to the controller's
//! /confirm_recording endpoint.

mod capture;
mod confirm;
mod handlers;
mod routes;
mod state;

pub use capture::{CapturePhase, CaptureService, ValidatedJob};
pub use confirm::ConfirmClient;
pub use routes::create_router;
pub use state::RecorderState;
