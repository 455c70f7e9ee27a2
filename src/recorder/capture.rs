use super::confirm::ConfirmClient;
use crate::audio::{write_wav, CaptureDevice, CaptureSpec};
use crate::error::{Error, Result};
use crate::job::{DEFAULT_FREQUENCY, MAX_CAPTURE_SECS};
use crate::protocol::{ConfirmRecordingRequest, InitiateRecordingRequest};
use anyhow::Context;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Where an in-flight capture currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CapturePhase {
    Received,
    Countdown,
    Recording,
    Writing,
}

/// A capture job that passed boundary validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedJob {
    pub filename: String,
    pub duration: Duration,
    pub frequency: f64,
    pub countdown: Duration,
}

impl ValidatedJob {
    pub fn from_request(req: InitiateRecordingRequest) -> Result<Self> {
        let filename = req
            .filename
            .ok_or_else(|| Error::InvalidJob("missing filename".to_string()))?;
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.chars().any(|c| matches!(c, '/' | '\\') || c.is_control())
        {
            return Err(Error::InvalidJob(format!("invalid filename {:?}", filename)));
        }

        let duration = req
            .duration
            .ok_or_else(|| Error::InvalidJob("missing duration".to_string()))?;
        if !duration.is_finite() || duration <= 0.0 || duration > MAX_CAPTURE_SECS {
            return Err(Error::InvalidJob(format!(
                "duration must be > 0 and at most {}, got {}",
                MAX_CAPTURE_SECS, duration
            )));
        }

        let countdown = req.countdown.unwrap_or(0.0);
        if !countdown.is_finite() || countdown < 0.0 || countdown > MAX_CAPTURE_SECS {
            return Err(Error::InvalidJob(format!(
                "countdown must be between 0 and {}, got {}",
                MAX_CAPTURE_SECS, countdown
            )));
        }

        let frequency = req
            .frequency
            .filter(|f| f.is_finite() && *f > 0.0)
            .unwrap_or(DEFAULT_FREQUENCY);

        let duration = Duration::try_from_secs_f64(duration)
            .map_err(|e| Error::InvalidJob(format!("duration out of range: {}", e)))?;
        let countdown = Duration::try_from_secs_f64(countdown)
            .map_err(|e| Error::InvalidJob(format!("countdown out of range: {}", e)))?;

        Ok(Self {
            filename,
            duration,
            frequency,
            countdown,
        })
    }
}

/// Runs captures against the device and reports their outcome
pub struct CaptureService {
    device: Arc<dyn CaptureDevice>,
    recordings_dir: PathBuf,
    sample_rate: u32,
    channels: u16,
    permits: Semaphore,
    phases: PhaseMap,
    confirmer: ConfirmClient,
}

impl CaptureService {
    pub fn new(
        device: Arc<dyn CaptureDevice>,
        recordings_dir: PathBuf,
        sample_rate: u32,
        channels: u16,
        max_concurrent: usize,
        confirmer: ConfirmClient,
    ) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&recordings_dir)
            .with_context(|| format!("Failed to create recordings directory {:?}", recordings_dir))?;

        info!(
            "Capture service ready: device={}, {}Hz, {} channel(s), dir={}",
            device.name(),
            sample_rate,
            channels,
            recordings_dir.display()
        );

        Ok(Self {
            device,
            recordings_dir,
            sample_rate,
            channels,
            permits: Semaphore::new(max_concurrent.max(1)),
            phases: Arc::new(RwLock::new(HashMap::new())),
            confirmer,
        })
    }

    pub fn recordings_dir(&self) -> &Path {
        &self.recordings_dir
    }

    /// Path the capture for `filename` is written to
    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.recordings_dir.join(filename)
    }

    /// Snapshot of in-flight captures
    pub async fn phases(&self) -> HashMap<String, CapturePhase> {
        self.phases.read().await.clone()
    }

    /// Mark a job Received; a filename already in flight is refused
    pub async fn admit(&self, job: &ValidatedJob) -> Result<()> {
        let mut phases = self.phases.write().await;
        if phases.contains_key(&job.filename) {
            return Err(Error::DuplicateSession(job.filename.clone()));
        }
        phases.insert(job.filename.clone(), CapturePhase::Received);
        info!("Capture received: {} ({:?})", job.filename, job.duration);
        Ok(())
    }

    /// Run an admitted job on its own task
    ///
    /// The capture keeps going if the caller stops waiting on the handle, so
    /// a dropped request still ends with a file and a confirmation.
    pub fn spawn_execute(self: &Arc<Self>, job: ValidatedJob) -> JoinHandle<Result<PathBuf>> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.execute(job).await })
    }

    /// Run an admitted job and send its confirmation
    ///
    /// The outcome is reported to the controller whether it succeeded or not,
    /// and also returned to the caller.
    pub async fn execute(&self, job: ValidatedJob) -> Result<PathBuf> {
        let _in_flight = PhaseGuard {
            phases: Arc::clone(&self.phases),
            filename: job.filename.clone(),
        };
        let result = self.capture_and_write(&job).await;

        let confirmation = match &result {
            Ok(path) => {
                info!("Capture written: {}", path.display());
                ConfirmRecordingRequest::completed(&job.filename)
            }
            Err(e) => {
                error!("Capture failed for {}: {}", job.filename, e);
                ConfirmRecordingRequest::failed(&job.filename, e.to_string())
            }
        };
        self.confirmer.spawn_send(confirmation);

        result
    }

    async fn capture_and_write(&self, job: &ValidatedJob) -> Result<PathBuf> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| Error::CaptureFailure(e.to_string()))?;

        if !job.countdown.is_zero() {
            self.set_phase(&job.filename, CapturePhase::Countdown).await;
            tokio::time::sleep(job.countdown).await;
        }

        self.set_phase(&job.filename, CapturePhase::Recording).await;
        let spec = CaptureSpec {
            duration: job.duration,
            sample_rate: self.sample_rate,
            channels: self.channels,
            frequency: job.frequency,
        };
        let samples = self
            .device
            .capture(spec)
            .await
            .map_err(|e| Error::CaptureFailure(format!("{:#}", e)))?;

        self.set_phase(&job.filename, CapturePhase::Writing).await;
        let path = self.output_path(&job.filename);
        let (sample_rate, channels) = (self.sample_rate, self.channels);
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_wav(&target, &samples, sample_rate, channels))
            .await
            .map_err(|e| Error::CaptureFailure(format!("write task failed: {}", e)))?
            .map_err(|e| Error::CaptureFailure(format!("{:#}", e)))?;

        Ok(path)
    }

    async fn set_phase(&self, filename: &str, phase: CapturePhase) {
        info!("Capture {} -> {:?}", filename, phase);
        self.phases
            .write()
            .await
            .insert(filename.to_string(), phase);
    }
}

type PhaseMap = Arc<RwLock<HashMap<String, CapturePhase>>>;

/// Drops a capture from the in-flight map however `execute` ends
struct PhaseGuard {
    phases: PhaseMap,
    filename: String,
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        if let Ok(mut phases) = self.phases.try_write() {
            phases.remove(&self.filename);
            return;
        }
        let phases = Arc::clone(&self.phases);
        let filename = std::mem::take(&mut self.filename);
        tokio::spawn(async move {
            phases.write().await.remove(&filename);
        });
    }
}
