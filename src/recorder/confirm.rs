use crate::protocol::ConfirmRecordingRequest;
use anyhow::{bail, Context, Result};
use std::time::Duration;
use tracing::{error, info, warn};

/// Delivers capture outcomes to the controller with bounded retries
#[derive(Clone)]
pub struct ConfirmClient {
    http: reqwest::Client,
    controller_url: String,
    retries: u32,
    backoff: Duration,
}

impl ConfirmClient {
    pub fn new(controller_url: impl Into<String>, retries: u32, backoff: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            controller_url: controller_url.into(),
            retries,
            backoff,
        })
    }

    /// Send one confirmation, retrying up to `retries` more times
    pub async fn send(&self, confirmation: &ConfirmRecordingRequest) -> Result<()> {
        let url = format!(
            "{}/confirm_recording",
            self.controller_url.trim_end_matches('/')
        );
        let attempts = self.retries + 1;

        for attempt in 1..=attempts {
            match self.try_send(&url, confirmation).await {
                Ok(()) => {
                    info!(
                        "Confirmation for {} delivered ({:?})",
                        confirmation.filename, confirmation.status
                    );
                    return Ok(());
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        "Confirmation for {} failed (attempt {}/{}): {:#}",
                        confirmation.filename, attempt, attempts, e
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(e) => {
                    error!(
                        "Dropping confirmation for {} after {} attempts: {:#}",
                        confirmation.filename, attempts, e
                    );
                    return Err(e);
                }
            }
        }

        bail!("No confirmation attempt made for {}", confirmation.filename)
    }

    /// Deliver in the background so the caller is not held up by retries
    pub fn spawn_send(&self, confirmation: ConfirmRecordingRequest) -> tokio::task::JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            // Failures are already logged by send()
            let _ = client.send(&confirmation).await;
        })
    }

    async fn try_send(&self, url: &str, confirmation: &ConfirmRecordingRequest) -> Result<()> {
        let response = self
            .http
            .post(url)
            .json(confirmation)
            .send()
            .await
            .context("Controller unreachable")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Controller returned {}", status);
        }
        Ok(())
    }
}
