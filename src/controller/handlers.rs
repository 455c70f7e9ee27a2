use super::state::ControllerState;
use crate::error::Error;
use crate::job;
use crate::protocol::{
    ConfirmRecordingRequest, SettingsUpdatedResponse, StartRecordingRequest,
    StartRecordingResponse, StatusResponse, STATUS_CONFIRMATION_RECEIVED,
    STATUS_RECORDING_STARTED, STATUS_SETTINGS_UPDATED,
};
use crate::session::{ConfirmOutcome, OrphanedConfirmation, SessionSnapshot, TrackerStats};
use crate::settings::{Settings, SettingsPatch};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub stats: TrackerStats,
    pub sessions: Vec<SessionSnapshot>,
    pub orphaned_confirmations: Vec<OrphanedConfirmation>,
}

/// POST /start_recording
/// Normalize the request, track it, and dispatch it to the recorder
pub async fn start_recording(
    State(state): State<ControllerState>,
    payload: Result<Json<StartRecordingRequest>, JsonRejection>,
) -> Result<Json<StartRecordingResponse>, Error> {
    let Json(req) = payload.map_err(|e| Error::InvalidRequest(e.body_text()))?;

    let settings = state.settings.get().await;
    let job = job::normalize(req, &settings)?;

    info!(
        "Starting recording {} ({}s, countdown {}s)",
        job.filename, job.duration, job.countdown
    );

    state.sessions.register(job.clone()).await?;

    match state
        .recorder
        .initiate(&settings.recorder_endpoint, &job)
        .await
    {
        Ok(details) => {
            info!("Recorder accepted {}", job.filename);
            Ok(Json(StartRecordingResponse {
                status: STATUS_RECORDING_STARTED.to_string(),
                details,
            }))
        }
        Err(e) => {
            // The session is ours, so this only fails if it was swept away
            if let Err(fail_err) = state.sessions.fail(&job.filename, e.to_string()).await {
                warn!("Could not mark {} failed: {}", job.filename, fail_err);
            }
            Err(e)
        }
    }
}

/// POST /confirm_recording
/// Recorder reports the outcome of a capture; always acknowledged
pub async fn confirm_recording(
    State(state): State<ControllerState>,
    payload: Result<Json<ConfirmRecordingRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, Error> {
    let Json(req) = payload.map_err(|e| Error::InvalidRequest(e.body_text()))?;

    if req.filename.is_empty() {
        warn!("Confirmation without a filename (status {:?})", req.status);
    } else {
        info!(
            "Recording confirmed for {} with status: {:?}",
            req.filename, req.status
        );
    }

    let outcome = state
        .sessions
        .confirm(&req.filename, req.status, req.error)
        .await;
    if outcome == ConfirmOutcome::Orphaned {
        warn!("No session for {}, recorded as orphaned", req.filename);
    }

    Ok(Json(StatusResponse::new(STATUS_CONFIRMATION_RECEIVED)))
}

/// GET /settings
pub async fn get_settings(State(state): State<ControllerState>) -> Json<Settings> {
    Json(state.settings.get().await)
}

/// POST /settings
/// Merge a partial update and persist it
pub async fn update_settings(
    State(state): State<ControllerState>,
    payload: Result<Json<SettingsPatch>, JsonRejection>,
) -> Result<Json<SettingsUpdatedResponse>, Error> {
    let Json(patch) = payload.map_err(|e| Error::InvalidSettings(e.body_text()))?;

    let settings = state.settings.update(patch).await?;

    Ok(Json(SettingsUpdatedResponse {
        status: STATUS_SETTINGS_UPDATED.to_string(),
        settings,
    }))
}

/// GET /sessions
pub async fn list_sessions(State(state): State<ControllerState>) -> Json<SessionsResponse> {
    Json(SessionsResponse {
        stats: state.sessions.stats().await,
        sessions: state.sessions.list().await,
        orphaned_confirmations: state.sessions.orphans().await,
    })
}

/// GET /sessions/:filename
pub async fn get_session(
    State(state): State<ControllerState>,
    Path(filename): Path<String>,
) -> Result<Json<SessionSnapshot>, Error> {
    state
        .sessions
        .get(&filename)
        .await
        .map(Json)
        .ok_or(Error::UnknownSession(filename))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
