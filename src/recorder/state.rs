use super::capture::CaptureService;
use crate::config::AckMode;
use std::sync::Arc;

/// Shared state for recorder handlers
#[derive(Clone)]
pub struct RecorderState {
    pub captures: Arc<CaptureService>,
    pub ack_mode: AckMode,
}

impl RecorderState {
    pub fn new(captures: Arc<CaptureService>, ack_mode: AckMode) -> Self {
        Self { captures, ack_mode }
    }
}
