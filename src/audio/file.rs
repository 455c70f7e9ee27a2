use anyhow::{Context, Result};
use hound::{WavReader, WavSpec, WavWriter};
use std::path::Path;
use tracing::{info, warn};

pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path)
            .context("Failed to open WAV file")?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let duration_seconds = samples.len() as f64 /
            (spec.sample_rate as f64 * spec.channels as f64);

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }
}

/// Write interleaved 16-bit PCM to `path` as a WAV file
///
/// A partially written file is removed on failure.
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32, channels: u16) -> Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let result = (|| -> Result<()> {
        let mut writer = WavWriter::create(path, spec)
            .with_context(|| format!("Failed to create WAV file: {:?}", path))?;
        for &sample in samples {
            writer.write_sample(sample)
                .context("Failed to write sample to WAV")?;
        }
        writer.finalize()
            .context("Failed to finalize WAV file")?;
        Ok(())
    })();

    if result.is_err() && path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove partial WAV file {}: {}", path.display(), e);
        }
    }

    result
}
