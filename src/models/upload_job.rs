//! Upload queue item model and its state machine.
//!
//! One row exists per (organization, evaluation, provider) triple. The row
//! is created by the enqueue service, mutated only by the worker (or the
//! enqueue service on resurrection), and never deleted.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attempt ceiling; the attempt that hits it fails terminally.
pub const MAX_ATTEMPTS: u32 = 8;

/// How long a claimed job may stay in flight before it is presumed abandoned.
pub const STALE_AFTER: Duration = Duration::from_secs(600);

/// Lifecycle state of an upload job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Processing,
    Retrying,
    Succeeded,
    Failed,
    Skipped,
    /// Reserved for external cancellation; no in-process transition produces it.
    Cancelled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Retrying => "retrying",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "processing" => Some(Self::Processing),
            "retrying" => Some(Self::Retrying),
            "succeeded" => Some(Self::Succeeded),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Terminal states are never picked up by the worker again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Skipped | Self::Cancelled
        )
    }

    /// States that may carry a `processing_started_at` claim stamp.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Processing | Self::Retrying)
    }
}

/// Delay before the next attempt, keyed by the attempt that just failed.
///
/// Fixed table rather than exponential: the worst-case latency stays bounded
/// for a human-in-the-loop workflow.
pub fn backoff(attempt: u32) -> Duration {
    let secs = match attempt {
        0 | 1 => 10,
        2 => 30,
        3 => 60,
        4 => 120,
        5 => 300,
        _ => 600,
    };
    Duration::from_secs(secs)
}

/// One desired upload, tracked durably until it reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadJob {
    /// Database row ID.
    pub id: i64,
    /// Owning tenant.
    pub organization_id: i64,
    /// The record whose PDF rendition gets delivered.
    pub evaluation_id: i64,
    /// Storage provider name.
    pub provider: String,
    pub state: JobState,
    /// Number of attempts started so far; bumped when the worker claims the job.
    pub attempt_count: u32,
    pub created_at: DateTime<Utc>,
    /// When the job is next due. Meaningful for `queued`/`retrying`; for
    /// `failed` it records the time of the terminal attempt.
    pub next_attempt_at: Option<DateTime<Utc>>,
    /// Claim stamp; non-null only while the job is in flight.
    pub processing_started_at: Option<DateTime<Utc>>,
    pub last_message: Option<String>,
    pub last_file_id: Option<String>,
    pub last_folder_id: Option<String>,
}

impl UploadJob {
    /// Whether the claim stamp is older than `stale_after`.
    pub fn is_stale(&self, stale_after: Duration, now: DateTime<Utc>) -> bool {
        match self.processing_started_at {
            Some(started) => {
                now.signed_duration_since(started)
                    > chrono::Duration::seconds(stale_after.as_secs() as i64)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip() {
        for state in [
            JobState::Queued,
            JobState::Processing,
            JobState::Retrying,
            JobState::Succeeded,
            JobState::Failed,
            JobState::Skipped,
            JobState::Cancelled,
        ] {
            assert_eq!(JobState::from_str(state.as_str()), Some(state));
        }
        assert_eq!(JobState::from_str("bogus"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobState::Succeeded.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::Skipped.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
        assert!(!JobState::Queued.is_terminal());
        assert!(!JobState::Processing.is_terminal());
        assert!(!JobState::Retrying.is_terminal());
    }

    #[test]
    fn test_backoff_table() {
        assert_eq!(backoff(1), Duration::from_secs(10));
        assert_eq!(backoff(2), Duration::from_secs(30));
        assert_eq!(backoff(3), Duration::from_secs(60));
        assert_eq!(backoff(4), Duration::from_secs(120));
        assert_eq!(backoff(5), Duration::from_secs(300));
        assert_eq!(backoff(6), Duration::from_secs(600));
        // Constant past the end of the table.
        assert_eq!(backoff(7), Duration::from_secs(600));
        assert_eq!(backoff(100), Duration::from_secs(600));
    }

    #[test]
    fn test_staleness() {
        let now = Utc::now();
        let mut job = UploadJob {
            id: 1,
            organization_id: 1,
            evaluation_id: 1,
            provider: "google_drive".to_string(),
            state: JobState::Processing,
            attempt_count: 1,
            created_at: now,
            next_attempt_at: None,
            processing_started_at: Some(now - chrono::Duration::seconds(700)),
            last_message: None,
            last_file_id: None,
            last_folder_id: None,
        };
        assert!(job.is_stale(STALE_AFTER, now));

        job.processing_started_at = Some(now - chrono::Duration::seconds(30));
        assert!(!job.is_stale(STALE_AFTER, now));

        job.processing_started_at = None;
        assert!(!job.is_stale(STALE_AFTER, now));
    }
}
