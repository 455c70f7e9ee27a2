use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the session tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Age after which a Pending session is evicted
    /// Default: 120 seconds
    pub session_timeout: Duration,

    /// How long finished sessions stay queryable
    /// Default: 1 hour
    pub retention: Duration,

    /// Number of orphaned confirmations remembered
    pub orphan_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_secs(120),
            retention: Duration::from_secs(3600),
            orphan_capacity: 64,
        }
    }
}
