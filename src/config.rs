use crate::audio::DeviceKind;
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variables override file values, e.g.
/// `SAMPLE_CAPTURE__RECORDER__PORT=6001`
pub const ENV_PREFIX: &str = "SAMPLE_CAPTURE";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub controller: ControllerConfig,
    pub recorder: RecorderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    pub bind: String,
    pub port: u16,
    /// JSON file holding the runtime-editable capture settings
    pub settings_path: PathBuf,
    pub session_timeout_secs: u64,
    pub sweep_interval_secs: u64,
    pub session_retention_secs: u64,
    /// Upper bound on a dispatch call, including the recording itself
    pub dispatch_timeout_secs: u64,
}

impl ControllerConfig {
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn session_retention(&self) -> Duration {
        Duration::from_secs(self.session_retention_secs)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }
}

/// When the recorder answers the capture request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckMode {
    /// After the capture has been written
    Completion,
    /// As soon as the job is validated; the outcome only arrives by confirmation
    Accepted,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecorderConfig {
    pub bind: String,
    pub port: u16,
    /// Base URL of the controller, for confirmations
    pub controller_url: String,
    pub recordings_path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
    pub device: DeviceKind,
    pub ack_mode: AckMode,
    pub confirm_retries: u32,
    pub confirm_backoff_ms: u64,
    pub max_concurrent_captures: usize,
}

impl Config {
    /// Load from `path` (any format the config crate understands, extension
    /// optional, file optional) layered under environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = Self::builder()?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Built-in defaults only
    pub fn defaults() -> Result<Self> {
        Ok(Self::builder()?.build()?.try_deserialize()?)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("controller.bind", "0.0.0.0")?
            .set_default("controller.port", 5000)?
            .set_default("controller.settings_path", "config.json")?
            .set_default("controller.session_timeout_secs", 120)?
            .set_default("controller.sweep_interval_secs", 15)?
            .set_default("controller.session_retention_secs", 3600)?
            .set_default("controller.dispatch_timeout_secs", 600)?
            .set_default("recorder.bind", "0.0.0.0")?
            .set_default("recorder.port", 5001)?
            .set_default("recorder.controller_url", "http://127.0.0.1:5000")?
            .set_default("recorder.recordings_path", "recordings")?
            .set_default("recorder.sample_rate", 44100)?
            .set_default("recorder.channels", 1)?
            .set_default("recorder.device", "tone")?
            .set_default("recorder.ack_mode", "completion")?
            .set_default("recorder.confirm_retries", 3)?
            .set_default("recorder.confirm_backoff_ms", 500)?
            .set_default("recorder.max_concurrent_captures", 1)?)
    }
}
