use crate::settings::Settings;
use serde::{Deserialize, Serialize};

pub const STATUS_RECORDING_STARTED: &str = "Recording started";
pub const STATUS_RECORDING_COMPLETED: &str = "Recording completed";
pub const STATUS_RECORDING_ACCEPTED: &str = "Recording accepted";
pub const STATUS_CONFIRMATION_RECEIVED: &str = "Confirmation received";
pub const STATUS_SETTINGS_UPDATED: &str = "Settings updated";
pub const STATUS_ERROR: &str = "Error";

// ============================================================================
// Controller
// ============================================================================

/// POST /start_recording body; every field falls back to a default
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRecordingRequest {
    pub note: Option<String>,
    pub frequency: Option<f64>,
    pub articulation: Option<String>,
    pub instrument: Option<String>,
    /// Seconds to wait before the capture starts
    pub countdown: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartRecordingResponse {
    pub status: String,
    /// Acknowledgment body returned by the recorder
    pub details: serde_json::Value,
}

/// Outcome reported by the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfirmStatus {
    Completed,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

/// POST /confirm_recording body
///
/// A body without `filename` still parses, with an empty name, so that the
/// confirmation is acknowledged and logged rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmRecordingRequest {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub status: ConfirmStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConfirmRecordingRequest {
    pub fn completed(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: ConfirmStatus::Completed,
            error: None,
        }
    }

    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: ConfirmStatus::Error,
            error: Some(error.into()),
        }
    }
}

/// Plain `{status}` reply
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

/// POST /settings reply
#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsUpdatedResponse {
    pub status: String,
    pub settings: Settings,
}

// ============================================================================
// Recorder
// ============================================================================

/// POST /initiate_recording body
///
/// `filename` and `duration` are required; they are optional here so that
/// a missing field is reported as an invalid job rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitiateRecordingRequest {
    pub filename: Option<String>,
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub articulation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown: Option<f64>,
}

/// Recorder acknowledgment for an accepted or finished capture
#[derive(Debug, Serialize, Deserialize)]
pub struct CaptureAck {
    pub status: String,
    pub file: String,
}

// ============================================================================
// Shared
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            error: error.into(),
        }
    }
}
