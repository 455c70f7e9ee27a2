use super::config::TrackerConfig;
use super::stats::{
    OrphanedConfirmation, SessionSnapshot, SessionStatus, TrackerStats,
};
use crate::error::{Error, Result};
use crate::job::CaptureJob;
use crate::protocol::ConfirmStatus;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of matching a confirmation against the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Session moved to the given state
    Applied(SessionStatus),
    /// Session had already finished; left unchanged
    Duplicate(SessionStatus),
    /// No session with that filename
    Orphaned,
}

#[derive(Debug, Clone)]
struct Session {
    job: CaptureJob,
    status: SessionStatus,
    detail: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Failed by the controller itself, not by a recorder report
    failed_locally: bool,
}

impl Session {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            job: self.job.clone(),
            status: self.status,
            detail: self.detail.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn transition(&mut self, status: SessionStatus, detail: Option<String>, now: DateTime<Utc>) {
        self.status = status;
        self.detail = detail;
        self.updated_at = now;
        self.failed_locally = false;
    }

    /// The recorder's report is authoritative over a local dispatch failure
    fn accepts_confirmation(&self) -> bool {
        !self.status.is_terminal() || self.failed_locally
    }
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, Session>,
    orphans: VecDeque<OrphanedConfirmation>,
    orphan_count: u64,
}

/// Tracks every capture job from dispatch until its confirmation
pub struct SessionTracker {
    config: TrackerConfig,
    inner: Mutex<Inner>,
}

impl SessionTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Start tracking a job as Pending
    pub async fn register(&self, job: CaptureJob) -> Result<SessionSnapshot> {
        self.register_at(job, Utc::now()).await
    }

    pub async fn register_at(&self, job: CaptureJob, now: DateTime<Utc>) -> Result<SessionSnapshot> {
        let mut inner = self.inner.lock().await;

        if inner.sessions.contains_key(&job.filename) {
            warn!("Refusing duplicate session for {}", job.filename);
            return Err(Error::DuplicateSession(job.filename));
        }

        let session = Session {
            job,
            status: SessionStatus::Pending,
            detail: None,
            created_at: now,
            updated_at: now,
            failed_locally: false,
        };
        let snapshot = session.snapshot();
        info!("Session registered: {}", snapshot.job.filename);
        inner.sessions.insert(snapshot.job.filename.clone(), session);

        Ok(snapshot)
    }

    /// Apply a confirmation reported by the recorder
    ///
    /// Never fails: unknown filenames are logged as orphans and finished
    /// sessions are left untouched, except that a session failed by
    /// [`fail`](Self::fail) still takes the recorder's outcome.
    pub async fn confirm(
        &self,
        filename: &str,
        status: ConfirmStatus,
        error: Option<String>,
    ) -> ConfirmOutcome {
        self.confirm_at(filename, status, error, Utc::now()).await
    }

    pub async fn confirm_at(
        &self,
        filename: &str,
        status: ConfirmStatus,
        error: Option<String>,
        now: DateTime<Utc>,
    ) -> ConfirmOutcome {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        let Some(session) = inner.sessions.get_mut(filename) else {
            warn!(
                "Orphaned confirmation for {} with status {:?}",
                filename, status
            );
            inner.orphan_count += 1;
            inner.orphans.push_back(OrphanedConfirmation {
                filename: filename.to_string(),
                status: format!("{:?}", status),
                received_at: now,
            });
            while inner.orphans.len() > self.config.orphan_capacity {
                inner.orphans.pop_front();
            }
            return ConfirmOutcome::Orphaned;
        };

        if !session.accepts_confirmation() {
            info!(
                "Duplicate confirmation for {} ({:?}), session already {:?}",
                filename, status, session.status
            );
            return ConfirmOutcome::Duplicate(session.status);
        }

        let late = matches!(session.status, SessionStatus::Evicted | SessionStatus::Failed);
        let (next, detail) = match status {
            ConfirmStatus::Completed => (SessionStatus::Completed, None),
            ConfirmStatus::Error => (
                SessionStatus::Failed,
                Some(error.unwrap_or_else(|| "recorder reported an error".to_string())),
            ),
            ConfirmStatus::Unknown => (
                SessionStatus::Failed,
                Some(error.unwrap_or_else(|| "recorder reported an unknown status".to_string())),
            ),
        };
        session.transition(next, detail, now);

        match next {
            SessionStatus::Completed => info!(
                "Recording confirmed for {}{}",
                filename,
                if late { " (overriding earlier status)" } else { "" }
            ),
            _ => warn!(
                "Recording failed for {}: {}",
                filename,
                session.detail.as_deref().unwrap_or_default()
            ),
        }

        ConfirmOutcome::Applied(next)
    }

    /// Mark a session Failed from the controller side, e.g. when the dispatch
    /// to the recorder fails; a no-op once the session has finished
    pub async fn fail(&self, filename: &str, reason: impl Into<String>) -> Result<SessionStatus> {
        let now = Utc::now();
        let mut inner = self.inner.lock().await;

        let session = inner
            .sessions
            .get_mut(filename)
            .ok_or_else(|| Error::UnknownSession(filename.to_string()))?;

        if !session.status.is_terminal() {
            let reason = reason.into();
            warn!("Session failed: {}: {}", filename, reason);
            session.transition(SessionStatus::Failed, Some(reason), now);
            session.failed_locally = true;
        }

        Ok(session.status)
    }

    pub async fn get(&self, filename: &str) -> Option<SessionSnapshot> {
        let inner = self.inner.lock().await;
        inner.sessions.get(filename).map(Session::snapshot)
    }

    /// All sessions, oldest first
    pub async fn list(&self) -> Vec<SessionSnapshot> {
        let inner = self.inner.lock().await;
        let mut sessions: Vec<_> = inner.sessions.values().map(Session::snapshot).collect();
        sessions.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.job.filename.cmp(&b.job.filename))
        });
        sessions
    }

    pub async fn orphans(&self) -> Vec<OrphanedConfirmation> {
        let inner = self.inner.lock().await;
        inner.orphans.iter().cloned().collect()
    }

    pub async fn stats(&self) -> TrackerStats {
        let inner = self.inner.lock().await;
        let mut stats = TrackerStats {
            orphaned_confirmations: inner.orphan_count,
            ..TrackerStats::default()
        };
        for session in inner.sessions.values() {
            match session.status {
                SessionStatus::Pending => stats.pending += 1,
                SessionStatus::Completed => stats.completed += 1,
                SessionStatus::Failed => stats.failed += 1,
                SessionStatus::Evicted => stats.evicted += 1,
            }
        }
        stats
    }

    /// Evict stale Pending sessions and forget expired ones
    ///
    /// Returns `(evicted, removed)`.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> (usize, usize) {
        let mut inner = self.inner.lock().await;
        let mut evicted = 0;

        for (filename, session) in inner.sessions.iter_mut() {
            if session.status == SessionStatus::Pending
                && age(now, session.created_at) >= self.config.session_timeout
            {
                warn!(
                    "Session {} pending for more than {:?}, evicting",
                    filename, self.config.session_timeout
                );
                session.transition(
                    SessionStatus::Evicted,
                    Some("no confirmation before timeout".to_string()),
                    now,
                );
                evicted += 1;
            }
        }

        let before = inner.sessions.len();
        let retention = self.config.retention;
        inner.sessions.retain(|_, session| {
            session.status == SessionStatus::Pending || age(now, session.updated_at) < retention
        });
        let removed = before - inner.sessions.len();

        if evicted > 0 || removed > 0 {
            debug!("Sweep evicted {} and removed {} sessions", evicted, removed);
        }

        (evicted, removed)
    }

    /// Run `sweep_at` every `interval` until the task is aborted
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Session sweeper started (every {:?})", interval);
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.sweep_at(Utc::now()).await;
            }
        })
    }
}

fn age(now: DateTime<Utc>, then: DateTime<Utc>) -> Duration {
    (now - then).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(filename: &str) -> CaptureJob {
        CaptureJob {
            filename: filename.to_string(),
            note: "A4".into(),
            frequency: 440.0,
            articulation: "long".into(),
            instrument: "guitar".into(),
            countdown: 0.0,
            duration: 1.0,
            timestamp: "20240101000000".into(),
        }
    }

    fn tracker() -> SessionTracker {
        SessionTracker::new(TrackerConfig {
            session_timeout: Duration::from_secs(10),
            retention: Duration::from_secs(60),
            orphan_capacity: 2,
        })
    }

    #[tokio::test]
    async fn test_register_and_confirm() {
        let tracker = tracker();
        tracker.register(job("a.wav")).await.unwrap();

        let outcome = tracker.confirm("a.wav", ConfirmStatus::Completed, None).await;

        assert_eq!(outcome, ConfirmOutcome::Applied(SessionStatus::Completed));
        assert_eq!(tracker.get("a.wav").await.unwrap().status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_error_confirmation_keeps_detail() {
        let tracker = tracker();
        tracker.register(job("a.wav")).await.unwrap();

        tracker
            .confirm("a.wav", ConfirmStatus::Error, Some("device busy".into()))
            .await;

        let session = tracker.get("a.wav").await.unwrap();
        assert_eq!(session.status, SessionStatus::Failed);
        assert_eq!(session.detail.as_deref(), Some("device busy"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let tracker = tracker();
        tracker.register(job("a.wav")).await.unwrap();

        let err = tracker.register(job("a.wav")).await.unwrap_err();

        assert!(matches!(err, Error::DuplicateSession(_)));
    }

    #[tokio::test]
    async fn test_unknown_confirmation_is_orphaned() {
        let tracker = tracker();
        tracker.register(job("a.wav")).await.unwrap();
        let before = tracker.get("a.wav").await.unwrap();

        let outcome = tracker.confirm("b.wav", ConfirmStatus::Completed, None).await;

        assert_eq!(outcome, ConfirmOutcome::Orphaned);
        let after = tracker.get("a.wav").await.unwrap();
        assert_eq!(after.status, before.status);
        assert_eq!(after.updated_at, before.updated_at);
        assert_eq!(tracker.stats().await.orphaned_confirmations, 1);
    }

    #[tokio::test]
    async fn test_orphan_log_is_bounded() {
        let tracker = tracker();
        for name in ["x.wav", "y.wav", "z.wav"] {
            tracker.confirm(name, ConfirmStatus::Completed, None).await;
        }

        let orphans = tracker.orphans().await;
        assert_eq!(orphans.len(), 2);
        assert_eq!(orphans[0].filename, "y.wav");
        assert_eq!(tracker.stats().await.orphaned_confirmations, 3);
    }

    #[tokio::test]
    async fn test_terminal_session_not_mutated() {
        let tracker = tracker();
        tracker.register(job("a.wav")).await.unwrap();
        tracker.confirm("a.wav", ConfirmStatus::Completed, None).await;

        let outcome = tracker
            .confirm("a.wav", ConfirmStatus::Error, Some("late".into()))
            .await;
        let status = tracker.fail("a.wav", "dispatch failed").await.unwrap();

        assert_eq!(outcome, ConfirmOutcome::Duplicate(SessionStatus::Completed));
        assert_eq!(status, SessionStatus::Completed);
        assert!(tracker.get("a.wav").await.unwrap().detail.is_none());
    }

    #[tokio::test]
    async fn test_recorder_outcome_overrides_local_failure() {
        let tracker = tracker();
        tracker.register(job("a.wav")).await.unwrap();
        tracker.fail("a.wav", "dispatch timed out").await.unwrap();

        let outcome = tracker.confirm("a.wav", ConfirmStatus::Completed, None).await;
        assert_eq!(outcome, ConfirmOutcome::Applied(SessionStatus::Completed));
        let session = tracker.get("a.wav").await.unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.detail.is_none());

        // Once the recorder has reported, later confirmations are duplicates
        let outcome = tracker
            .confirm("a.wav", ConfirmStatus::Error, Some("late".into()))
            .await;
        assert_eq!(outcome, ConfirmOutcome::Duplicate(SessionStatus::Completed));
    }

    #[tokio::test]
    async fn test_recorder_failure_is_final() {
        let tracker = tracker();
        tracker.register(job("a.wav")).await.unwrap();
        tracker
            .confirm("a.wav", ConfirmStatus::Error, Some("device busy".into()))
            .await;

        let outcome = tracker.confirm("a.wav", ConfirmStatus::Completed, None).await;

        assert_eq!(outcome, ConfirmOutcome::Duplicate(SessionStatus::Failed));
    }

    #[tokio::test]
    async fn test_fail_unknown_session() {
        let tracker = tracker();
        let err = tracker.fail("nope.wav", "x").await.unwrap_err();
        assert!(matches!(err, Error::UnknownSession(_)));
    }

    #[tokio::test]
    async fn test_sweep_evicts_then_late_confirmation_applies() {
        let tracker = tracker();
        let start = Utc::now();
        tracker.register_at(job("a.wav"), start).await.unwrap();

        let (evicted, removed) = tracker.sweep_at(start + chrono::Duration::seconds(5)).await;
        assert_eq!((evicted, removed), (0, 0));

        let (evicted, _) = tracker.sweep_at(start + chrono::Duration::seconds(11)).await;
        assert_eq!(evicted, 1);
        assert_eq!(tracker.get("a.wav").await.unwrap().status, SessionStatus::Evicted);

        let outcome = tracker.confirm("a.wav", ConfirmStatus::Completed, None).await;
        assert_eq!(outcome, ConfirmOutcome::Applied(SessionStatus::Completed));
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_sessions() {
        let tracker = tracker();
        let start = Utc::now();
        tracker.register_at(job("a.wav"), start).await.unwrap();
        tracker
            .confirm_at("a.wav", ConfirmStatus::Completed, None, start)
            .await;
        tracker.register_at(job("b.wav"), start).await.unwrap();

        let (_, removed) = tracker.sweep_at(start + chrono::Duration::seconds(61)).await;

        assert_eq!(removed, 1);
        assert!(tracker.get("a.wav").await.is_none());
        // Evicted by this sweep, so retained
        assert_eq!(tracker.get("b.wav").await.unwrap().status, SessionStatus::Evicted);
    }

    #[tokio::test]
    async fn test_concurrent_transitions() {
        let tracker = Arc::new(tracker());
        for i in 0..50 {
            tracker.register(job(&format!("{}.wav", i))).await.unwrap();
        }

        let mut handles = Vec::new();
        for i in 0..50 {
            let tracker = Arc::clone(&tracker);
            handles.push(tokio::spawn(async move {
                let name = format!("{}.wav", i);
                if i % 2 == 0 {
                    tracker.confirm(&name, ConfirmStatus::Completed, None).await;
                } else {
                    tracker.fail(&name, "boom").await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = tracker.stats().await;
        assert_eq!(stats.completed, 25);
        assert_eq!(stats.failed, 25);
        assert_eq!(stats.pending, 0);
    }
}
