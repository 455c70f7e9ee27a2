// Microphone capture through cpal
//
// cpal streams are not Send, so the stream is built and dropped on a
// blocking worker thread that owns it for the whole capture.

use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{info, warn};

use super::backend::{CaptureDevice, CaptureSpec};

/// Extra time allowed past the capture duration before giving up
const CAPTURE_GRACE: Duration = Duration::from_secs(5);

pub struct MicrophoneDevice;

impl MicrophoneDevice {
    pub fn new() -> Self {
        Self
    }

    fn capture_blocking(spec: CaptureSpec) -> Result<Vec<i16>> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("No default input device available"))?;

        info!(
            "Capturing {:?} from {}",
            spec.duration,
            device.name().unwrap_or_else(|_| "unknown device".to_string())
        );

        let config = cpal::StreamConfig {
            channels: spec.channels,
            sample_rate: cpal::SampleRate(spec.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let wanted = spec.sample_count();
        let (tx, rx) = mpsc::channel::<Vec<f32>>();
        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let _ = tx.send(data.to_vec());
                },
                |e| warn!("Input stream error: {}", e),
                None,
            )
            .context("Failed to open input stream")?;
        stream.play().context("Failed to start input stream")?;

        let deadline = std::time::Instant::now() + spec.duration + CAPTURE_GRACE;
        // Grow with the stream past the first second
        let first_second = spec.sample_rate as usize * spec.channels.max(1) as usize;
        let mut samples = Vec::with_capacity(wanted.min(first_second));
        while samples.len() < wanted {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                bail!(
                    "Input device delivered {} of {} samples before timing out",
                    samples.len(),
                    wanted
                );
            }
            let block = rx
                .recv_timeout(remaining)
                .context("Input stream stopped delivering audio")?;
            samples.extend(
                block
                    .into_iter()
                    .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16),
            );
        }
        drop(stream);

        samples.truncate(wanted);
        Ok(samples)
    }
}

impl Default for MicrophoneDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CaptureDevice for MicrophoneDevice {
    async fn capture(&self, spec: CaptureSpec) -> Result<Vec<i16>> {
        tokio::task::spawn_blocking(move || Self::capture_blocking(spec))
            .await
            .context("Capture worker panicked")?
    }

    fn name(&self) -> &str {
        "microphone"
    }
}
