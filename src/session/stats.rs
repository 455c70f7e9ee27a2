use crate::job::CaptureJob;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Pending,
    Completed,
    Failed,
    /// Pending for longer than the timeout; a late confirmation still applies
    Evicted,
}

impl SessionStatus {
    /// Completed or Failed
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

/// Point-in-time view of one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub job: CaptureJob,
    pub status: SessionStatus,
    /// Failure reason, if any
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A confirmation that matched no tracked session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrphanedConfirmation {
    pub filename: String,
    pub status: String,
    pub received_at: DateTime<Utc>,
}

/// Counters across the tracker's lifetime
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerStats {
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
    pub evicted: usize,
    pub orphaned_confirmations: u64,
}
