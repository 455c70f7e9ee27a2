// Shared helpers for spinning up controller and recorder services on loopback

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use sample_capture::{
    controller, recorder, AckMode, CaptureDevice, CaptureService, CaptureSpec, ConfirmClient,
    ControllerState, RecorderClient, RecorderState, SessionSnapshot, SessionStatus,
    SessionTracker, Settings, SettingsStore, ToneDevice, TrackerConfig,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Capture device that always fails
pub struct BrokenDevice;

#[async_trait]
impl CaptureDevice for BrokenDevice {
    async fn capture(&self, _spec: CaptureSpec) -> Result<Vec<i16>> {
        anyhow::bail!("input device disconnected")
    }

    fn name(&self) -> &str {
        "broken"
    }
}

pub async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

pub fn serve(listener: TcpListener, app: axum::Router) {
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

pub fn url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

pub fn controller_state(settings_path: &Path, recorder_endpoint: &str) -> ControllerState {
    let settings = Settings {
        recorder_endpoint: recorder_endpoint.to_string(),
        countdown_duration: 0.0,
        articulation_durations: [("short".to_string(), 0.05), ("long".to_string(), 0.1)]
            .into_iter()
            .collect(),
    };
    ControllerState::new(
        Arc::new(SettingsStore::new(settings_path, settings)),
        Arc::new(SessionTracker::new(TrackerConfig::default())),
        RecorderClient::new(Duration::from_secs(10)).unwrap(),
    )
}

pub fn recorder_state(
    recordings_dir: &Path,
    controller_url: &str,
    device: Arc<dyn CaptureDevice>,
    ack_mode: AckMode,
) -> RecorderState {
    let confirmer = ConfirmClient::new(controller_url, 2, Duration::from_millis(20)).unwrap();
    let captures = CaptureService::new(
        device,
        recordings_dir.to_path_buf(),
        8000,
        1,
        1,
        confirmer,
    )
    .unwrap();
    RecorderState::new(Arc::new(captures), ack_mode)
}

/// Controller and recorder wired to each other over loopback
pub struct Deployment {
    pub controller_url: String,
    pub recorder_url: String,
    pub controller: ControllerState,
    pub recorder: RecorderState,
}

pub async fn deploy(dir: &Path, device: Arc<dyn CaptureDevice>, ack_mode: AckMode) -> Deployment {
    let (controller_listener, controller_addr) = bind().await;
    let (recorder_listener, recorder_addr) = bind().await;

    let controller_state = controller_state(&dir.join("config.json"), &url(recorder_addr));
    let recorder_state = recorder_state(
        &dir.join("recordings"),
        &url(controller_addr),
        device,
        ack_mode,
    );

    serve(controller_listener, controller::create_router(controller_state.clone()));
    serve(recorder_listener, recorder::create_router(recorder_state.clone()));

    Deployment {
        controller_url: url(controller_addr),
        recorder_url: url(recorder_addr),
        controller: controller_state,
        recorder: recorder_state,
    }
}

pub fn tone() -> Arc<dyn CaptureDevice> {
    Arc::new(ToneDevice::instant())
}

/// Poll until the session leaves `Pending`, or give up after ~2s
pub async fn wait_for_outcome(tracker: &SessionTracker, filename: &str) -> SessionSnapshot {
    for _ in 0..100 {
        if let Some(session) = tracker.get(filename).await {
            if session.status != SessionStatus::Pending {
                return session;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("session {} never left Pending", filename);
}
