// Synthetic capture device producing a sine tone
//
// Lets the recorder run end to end on machines without an input device.

use anyhow::Result;
use std::f64::consts::TAU;
use tracing::debug;

use super::backend::{CaptureDevice, CaptureSpec};

/// Peak amplitude, about -6 dBFS
const AMPLITUDE: f64 = 0.5 * i16::MAX as f64;

pub struct ToneDevice {
    /// Block for the capture duration like a real device would
    realtime: bool,
}

impl ToneDevice {
    /// Tone device that takes as long as the requested capture
    pub fn realtime() -> Self {
        Self { realtime: true }
    }

    /// Tone device that returns immediately
    pub fn instant() -> Self {
        Self { realtime: false }
    }

    fn render(spec: &CaptureSpec) -> Vec<i16> {
        let channels = spec.channels.max(1) as usize;
        let frames = spec.sample_count() / channels;
        let step = TAU * spec.frequency / spec.sample_rate as f64;

        let mut samples = Vec::with_capacity(frames * channels);
        for n in 0..frames {
            let value = (AMPLITUDE * (step * n as f64).sin()) as i16;
            samples.extend(std::iter::repeat(value).take(channels));
        }
        samples
    }
}

#[async_trait::async_trait]
impl CaptureDevice for ToneDevice {
    async fn capture(&self, spec: CaptureSpec) -> Result<Vec<i16>> {
        debug!(
            "Rendering {:.1}Hz tone for {:?} at {}Hz",
            spec.frequency, spec.duration, spec.sample_rate
        );

        if self.realtime {
            tokio::time::sleep(spec.duration).await;
        }

        Ok(Self::render(&spec))
    }

    fn name(&self) -> &str {
        "tone"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_tone_length_matches_duration() {
        let spec = CaptureSpec {
            duration: Duration::from_millis(250),
            sample_rate: 8000,
            channels: 2,
            frequency: 440.0,
        };

        let samples = ToneDevice::instant().capture(spec).await.unwrap();

        assert_eq!(samples.len(), 4000);
        // Interleaved channels carry the same value
        assert_eq!(samples[10], samples[11]);
        assert!(samples.iter().any(|&s| s != 0));
    }
}
