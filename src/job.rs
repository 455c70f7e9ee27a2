//! Capture request normalization
//!
//! Turns a client request into a [`CaptureJob`]: defaults are filled in,
//! the capture duration is looked up from the articulation table and the
//! filename is derived from the sample's metadata and a timestamp.

use crate::error::{Error, Result};
use crate::protocol::{InitiateRecordingRequest, StartRecordingRequest};
use crate::settings::Settings;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NOTE: &str = "A4";
pub const DEFAULT_FREQUENCY: f64 = 440.0;
pub const DEFAULT_ARTICULATION: &str = "long";
pub const DEFAULT_INSTRUMENT: &str = "guitar";

/// Upper bound for a capture duration or countdown (seconds)
pub const MAX_CAPTURE_SECS: f64 = 600.0;

/// Sortable, fixed width, no separators
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// A capture request with every default applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub note: String,
    pub frequency: f64,
    pub articulation: String,
    pub instrument: String,
    pub countdown: f64,
}

impl CaptureRequest {
    pub fn from_client(request: StartRecordingRequest, settings: &Settings) -> Result<Self> {
        let request = Self {
            note: request.note.unwrap_or_else(|| DEFAULT_NOTE.to_string()),
            frequency: request.frequency.unwrap_or(DEFAULT_FREQUENCY),
            articulation: request
                .articulation
                .unwrap_or_else(|| DEFAULT_ARTICULATION.to_string()),
            instrument: request
                .instrument
                .unwrap_or_else(|| DEFAULT_INSTRUMENT.to_string()),
            countdown: request.countdown.unwrap_or(settings.countdown_duration),
        };
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<()> {
        check_name_part("note", &self.note)?;
        check_name_part("articulation", &self.articulation)?;
        check_name_part("instrument", &self.instrument)?;

        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(Error::InvalidRequest(format!(
                "frequency must be > 0, got {}",
                self.frequency
            )));
        }
        if !self.countdown.is_finite() || self.countdown < 0.0 || self.countdown > MAX_CAPTURE_SECS {
            return Err(Error::InvalidRequest(format!(
                "countdown must be between 0 and {}, got {}",
                MAX_CAPTURE_SECS, self.countdown
            )));
        }
        Ok(())
    }
}

/// `_` separates filename fields, so it may not appear inside one
fn check_name_part(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidRequest(format!("{} must not be empty", field)));
    }
    if let Some(c) = value
        .chars()
        .find(|c| matches!(c, '_' | '/' | '\\') || c.is_control())
    {
        return Err(Error::InvalidRequest(format!(
            "{} {:?} contains forbidden character {:?}",
            field, value, c
        )));
    }
    Ok(())
}

/// A normalized capture, keyed by its filename
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureJob {
    pub filename: String,
    pub note: String,
    pub frequency: f64,
    pub articulation: String,
    pub instrument: String,
    pub countdown: f64,
    /// Capture length in seconds
    pub duration: f64,
    pub timestamp: String,
}

impl CaptureJob {
    /// Payload sent to the recorder's capture endpoint
    pub fn to_payload(&self) -> InitiateRecordingRequest {
        InitiateRecordingRequest {
            filename: Some(self.filename.clone()),
            duration: Some(self.duration),
            note: Some(self.note.clone()),
            frequency: Some(self.frequency),
            articulation: Some(self.articulation.clone()),
            instrument: Some(self.instrument.clone()),
            timestamp: Some(self.timestamp.clone()),
            countdown: Some(self.countdown),
        }
    }
}

/// Build the capture filename
///
/// Two requests stamped within the same second with identical note,
/// articulation and instrument produce the same name.
pub fn capture_filename(note: &str, articulation: &str, instrument: &str, timestamp: &str) -> String {
    format!("{}_{}_{}_{}.wav", note, articulation, instrument, timestamp)
}

/// Normalize a client request using the current local time
pub fn normalize(request: StartRecordingRequest, settings: &Settings) -> Result<CaptureJob> {
    normalize_at(request, settings, Local::now().naive_local())
}

/// Normalize a client request with an explicit clock reading
pub fn normalize_at(
    request: StartRecordingRequest,
    settings: &Settings,
    now: NaiveDateTime,
) -> Result<CaptureJob> {
    let request = CaptureRequest::from_client(request, settings)?;

    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
    let duration = settings.duration_for(&request.articulation);
    let filename = capture_filename(
        &request.note,
        &request.articulation,
        &request.instrument,
        &timestamp,
    );

    Ok(CaptureJob {
        filename,
        note: request.note,
        frequency: request.frequency,
        articulation: request.articulation,
        instrument: request.instrument,
        countdown: request.countdown,
        duration,
        timestamp,
    })
}
