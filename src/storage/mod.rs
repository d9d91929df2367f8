//! Cloud storage provider abstraction.
//!
//! The system ships exactly one provider (Google Drive); the trait exists so
//! the pipeline and its tests never touch the network directly.

pub mod drive;

use async_trait::async_trait;

use crate::models::UploadStatus;

/// The single provider this system ships with.
pub const PROVIDER_GOOGLE_DRIVE: &str = "google_drive";

/// Result of one provider upload call.
///
/// Expected business conditions come back as `skipped`/`failed` outcomes;
/// `Err` is reserved for transport-level surprises, which callers treat as a
/// failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub status: UploadStatus,
    pub message: String,
    pub file_id: Option<String>,
    pub folder_id: Option<String>,
}

impl UploadOutcome {
    pub fn uploaded(
        message: impl Into<String>,
        file_id: impl Into<String>,
        folder_id: impl Into<String>,
    ) -> Self {
        Self {
            status: UploadStatus::Uploaded,
            message: message.into(),
            file_id: Some(file_id.into()),
            folder_id: Some(folder_id.into()),
        }
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            status: UploadStatus::Skipped,
            message: message.into(),
            file_id: None,
            folder_id: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: UploadStatus::Failed,
            message: message.into(),
            file_id: None,
            folder_id: None,
        }
    }
}

/// Everything a provider needs for one upload.
#[derive(Debug)]
pub struct UploadRequest<'a> {
    /// Opaque credential blob from the tenant integration.
    pub credentials: &'a str,
    /// Tenant root folder all uploads land under.
    pub root_folder_id: &'a str,
    /// Per-record subfolder name (already sanitized).
    pub folder_name: &'a str,
    pub file_name: &'a str,
    pub content: &'a [u8],
}

/// Errors a provider may raise for non-business failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("credentials rejected or malformed: {0}")]
    Credentials(String),
}

/// An external storage service that can receive rendered artifacts.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Stable provider name recorded on jobs and audit rows.
    fn name(&self) -> &'static str;

    /// Upload one artifact under `root/folder_name/file_name`.
    async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadOutcome, StorageError>;
}
