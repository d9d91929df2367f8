//! Append-only audit trail of upload attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Uploaded,
    Skipped,
    Failed,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "uploaded" => Some(Self::Uploaded),
            "skipped" => Some(Self::Skipped),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One audit row. Rows are never updated or deleted.
///
/// `attempt_number` equals the job's `attempt_count` at the time the attempt
/// ran; direct (non-queued) uploads log attempt number 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadLogEntry {
    pub id: i64,
    pub organization_id: i64,
    pub evaluation_id: i64,
    pub provider: String,
    pub status: UploadStatus,
    pub message: String,
    pub file_id: Option<String>,
    pub folder_id: Option<String>,
    pub attempt_number: u32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            UploadStatus::Uploaded,
            UploadStatus::Skipped,
            UploadStatus::Failed,
        ] {
            assert_eq!(UploadStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(UploadStatus::from_str(""), None);
    }
}
