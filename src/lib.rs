pub mod audio;
pub mod config;
pub mod controller;
pub mod error;
pub mod job;
pub mod protocol;
pub mod recorder;
pub mod session;
pub mod settings;

pub use audio::{AudioFile, CaptureDevice, CaptureDeviceFactory, CaptureSpec, DeviceKind, ToneDevice};
pub use config::{AckMode, Config};
pub use controller::{ControllerState, RecorderClient};
pub use error::{Error, Result};
pub use job::{normalize, normalize_at, CaptureJob, CaptureRequest};
pub use recorder::{CaptureService, ConfirmClient, RecorderState};
pub use session::{SessionSnapshot, SessionStatus, SessionTracker, TrackerConfig};
pub use settings::{Settings, SettingsPatch, SettingsStore};
