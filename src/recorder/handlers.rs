use super::capture::{CapturePhase, ValidatedJob};
use super::state::RecorderState;
use crate::config::AckMode;
use crate::error::Error;
use crate::protocol::{
    CaptureAck, InitiateRecordingRequest, STATUS_RECORDING_ACCEPTED, STATUS_RECORDING_COMPLETED,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::collections::HashMap;
use tracing::info;

/// POST /initiate_recording
/// Validate and run a capture job
///
/// In completion mode the reply is sent once the file is written; in
/// accepted mode it is sent right after validation. Either way the capture
/// runs on its own task and is not cancelled when the client hangs up.
pub async fn initiate_recording(
    State(state): State<RecorderState>,
    payload: Result<Json<InitiateRecordingRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(req) = payload.map_err(|e| Error::InvalidJob(e.body_text()))?;
    let job = ValidatedJob::from_request(req)?;

    state.captures.admit(&job).await?;

    match state.ack_mode {
        AckMode::Completion => {
            let path = state
                .captures
                .spawn_execute(job)
                .await
                .map_err(|e| Error::CaptureFailure(format!("capture task failed: {}", e)))??;
            Ok((
                StatusCode::OK,
                Json(CaptureAck {
                    status: STATUS_RECORDING_COMPLETED.to_string(),
                    file: path.display().to_string(),
                }),
            )
                .into_response())
        }
        AckMode::Accepted => {
            let file = state.captures.output_path(&job.filename);
            info!("Capture accepted: {}", job.filename);

            // Outcome travels through the confirmation
            drop(state.captures.spawn_execute(job));

            Ok((
                StatusCode::ACCEPTED,
                Json(CaptureAck {
                    status: STATUS_RECORDING_ACCEPTED.to_string(),
                    file: file.display().to_string(),
                }),
            )
                .into_response())
        }
    }
}

/// GET /captures
/// In-flight captures keyed by filename
pub async fn list_captures(State(state): State<RecorderState>) -> Json<HashMap<String, CapturePhase>> {
    Json(state.captures.phases().await)
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
