//! Worker configuration and pipeline outcome types.

use std::time::Duration;

use crate::models::{MAX_ATTEMPTS, STALE_AFTER};

/// Tuning for the polling worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Sleep between empty poll cycles.
    pub poll_interval: Duration,
    /// Jobs claimed per cycle.
    pub batch_size: u32,
    /// Attempt ceiling before a job fails terminally.
    pub max_attempts: u32,
    /// Age at which a claimed job is presumed abandoned.
    pub stale_after: Duration,
    /// Pause after an unexpected loop-level error.
    pub error_pause: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            batch_size: 5,
            max_attempts: MAX_ATTEMPTS,
            stale_after: STALE_AFTER,
            error_pause: Duration::from_secs(5),
        }
    }
}

/// How one pass through the gating pipeline resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Artifact stored with the provider.
    Uploaded {
        message: String,
        file_id: Option<String>,
        folder_id: Option<String>,
    },
    /// Expected, permanently-inapplicable condition; not an error.
    Skipped {
        message: String,
        file_id: Option<String>,
        folder_id: Option<String>,
    },
    /// Data-integrity problem; retrying cannot fix it.
    IntegrityFailure { message: String },
    /// Render or upload trouble; eligible for the backoff schedule.
    AttemptFailure { message: String },
}

impl Resolution {
    pub fn skipped(message: impl Into<String>) -> Self {
        Self::Skipped {
            message: message.into(),
            file_id: None,
            folder_id: None,
        }
    }

    /// Short label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Uploaded { .. } => "uploaded",
            Self::Skipped { .. } => "skipped",
            Self::IntegrityFailure { .. } => "failed",
            Self::AttemptFailure { .. } => "failed",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Uploaded { message, .. }
            | Self::Skipped { message, .. }
            | Self::IntegrityFailure { message }
            | Self::AttemptFailure { message } => message,
        }
    }
}
