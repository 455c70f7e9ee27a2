pub mod backend;
pub mod file;
pub mod tone;

#[cfg(feature = "microphone")]
pub mod microphone;

pub use backend::{CaptureDevice, CaptureDeviceFactory, CaptureSpec, DeviceKind};
pub use file::{write_wav, AudioFile};
pub use tone::ToneDevice;
