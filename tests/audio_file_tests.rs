// Integration tests for WAV output
//
// These tests verify that captured samples are written to disk and can be
// read back with the same format.

use anyhow::Result;
use sample_capture::audio::{write_wav, AudioFile};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_write_then_open() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("A4_long_guitar_20240101000000.wav");
    let samples: Vec<i16> = (0..44100).map(|i| (i % 200) as i16).collect();

    write_wav(&path, &samples, 44100, 1)?;
    let audio = AudioFile::open(&path)?;

    assert_eq!(audio.sample_rate, 44100);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.samples, samples);
    assert!((audio.duration_seconds - 1.0).abs() < 1e-9);
    assert!(audio.path.contains("A4_long_guitar"));

    Ok(())
}

#[test]
fn test_write_stereo() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("stereo.wav");

    write_wav(&path, &[1, -1, 2, -2], 8000, 2)?;
    let audio = AudioFile::open(&path)?;

    assert_eq!(audio.channels, 2);
    assert_eq!(audio.samples, vec![1, -1, 2, -2]);

    Ok(())
}

#[test]
fn test_write_into_missing_directory_fails() {
    let path = PathBuf::from("/nonexistent/path/to/audio.wav");
    let result = write_wav(&path, &[0; 16], 8000, 1);

    assert!(result.is_err(), "Writing into a missing directory should fail");
    assert!(!path.exists());
}

#[test]
fn test_audio_file_nonexistent() {
    let path = PathBuf::from("/nonexistent/path/to/audio.wav");
    let result = AudioFile::open(&path);

    assert!(result.is_err(), "Opening nonexistent file should fail");
}
