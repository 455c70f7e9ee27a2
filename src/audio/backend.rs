use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Parameters for a single fixed-length capture
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSpec {
    /// Capture length
    pub duration: Duration,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Pitch of the sample being captured, in Hz
    pub frequency: f64,
}

impl CaptureSpec {
    /// Total interleaved samples the capture should yield
    pub fn sample_count(&self) -> usize {
        let frames = (self.duration.as_secs_f64() * self.sample_rate as f64).round() as usize;
        frames * self.channels as usize
    }
}

/// Audio capture device
///
/// Implementations:
/// - Tone: synthesized sine at the requested frequency (bench testing)
/// - Microphone: default input device via cpal (`microphone` feature)
#[async_trait::async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Capture audio for the full duration of `spec`
    ///
    /// Returns interleaved 16-bit PCM samples. Not cancellable once started.
    async fn capture(&self, spec: CaptureSpec) -> Result<Vec<i16>>;

    /// Device name for logging
    fn name(&self) -> &str;
}

/// Capture device kind selected in the recorder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Tone,
    Microphone,
}

/// Capture device factory
pub struct CaptureDeviceFactory;

impl CaptureDeviceFactory {
    pub fn create(kind: DeviceKind) -> Result<Arc<dyn CaptureDevice>> {
        match kind {
            DeviceKind::Tone => Ok(Arc::new(super::tone::ToneDevice::realtime())),

            DeviceKind::Microphone => {
                #[cfg(feature = "microphone")]
                {
                    Ok(Arc::new(super::microphone::MicrophoneDevice::new()))
                }

                #[cfg(not(feature = "microphone"))]
                {
                    anyhow::bail!(
                        "Microphone capture requires building with the `microphone` feature"
                    )
                }
            }
        }
    }
}
