//! Protocol error taxonomy shared by the controller and recorder roles.

use crate::protocol::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

/// Convenience result type for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Capture job rejected before the capture started
    #[error("Invalid job: {0}")]
    InvalidJob(String),

    /// Client request rejected by the controller
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Settings patch failed validation
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Peer unreachable or answered with a non-success status
    #[error("{0}")]
    TransportFailure(String),

    /// Device or write error during a capture
    #[error("Capture failed: {0}")]
    CaptureFailure(String),

    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// A session with this filename is already tracked
    #[error("Session already exists: {0}")]
    DuplicateSession(String),

    /// Settings could not be written durably; the update was not applied
    #[error("Failed to persist settings: {0}")]
    ConfigPersistFailure(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJob(_) | Error::InvalidRequest(_) | Error::InvalidSettings(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::UnknownSession(_) => StatusCode::NOT_FOUND,
            Error::DuplicateSession(_) => StatusCode::CONFLICT,
            Error::TransportFailure(_)
            | Error::CaptureFailure(_)
            | Error::ConfigPersistFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
