use crate::error::{Error, Result};
use crate::job::CaptureJob;
use crate::protocol::ErrorResponse;
use std::time::Duration;
use tracing::{error, info};

/// HTTP client for the recorder's capture endpoint
#[derive(Clone)]
pub struct RecorderClient {
    http: reqwest::Client,
}

impl RecorderClient {
    /// `timeout` bounds the whole dispatch, so it must cover the longest capture
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::TransportFailure(e.to_string()))?;

        Ok(Self { http })
    }

    /// Send `job` to `endpoint` and return the recorder's acknowledgment body
    pub async fn initiate(&self, endpoint: &str, job: &CaptureJob) -> Result<serde_json::Value> {
        let url = format!("{}/initiate_recording", endpoint.trim_end_matches('/'));
        info!("Dispatching {} to {}", job.filename, url);

        let response = self
            .http
            .post(&url)
            .json(&job.to_payload())
            .send()
            .await
            .map_err(|e| {
                error!("Recorder unreachable at {}: {}", url, e);
                Error::TransportFailure(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::TransportFailure(e.to_string()))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            error!("Recorder rejected {}: {} {}", job.filename, status, detail);
            return Err(Error::TransportFailure(format!(
                "recorder returned {}: {}",
                status, detail
            )));
        }

        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
    }
}
