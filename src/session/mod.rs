//! Session bookkeeping for in-flight captures
//!
//! This module provides the `SessionTracker` that owns:
//! - One session per capture job, keyed by filename
//! - The Pending → Completed/Failed/Evicted state machine
//! - A log of confirmations that matched no session
//! - A periodic sweeper evicting stale Pending sessions

mod config;
mod stats;
mod tracker;

pub use config::TrackerConfig;
pub use stats::{OrphanedConfirmation, SessionSnapshot, SessionStatus, TrackerStats};
pub use tracker::{ConfirmOutcome, SessionTracker};
