//! Google Drive v3 upload client.
//!
//! Artifacts land in `root/<record subfolder>/<file>`. The client retries
//! transient provider errors internally with short fixed delays; scheduling
//! retries across attempts is the queue's job, not this client's.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use super::{StorageError, StorageProvider, UploadOutcome, UploadRequest, PROVIDER_GOOGLE_DRIVE};

const API_BASE: &str = "https://www.googleapis.com/drive/v3";
const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Immediate retry delays for transient provider errors.
const TRANSIENT_RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(3),
    Duration::from_secs(8),
];

/// Statuses worth an immediate retry: rate limiting and server-side trouble.
fn is_transient(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Escape a value for embedding in a Drive `q` search expression.
fn escape_query_term(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

const MULTIPART_BOUNDARY: &str = "evalsync_upload_boundary";

/// Drive's multipart upload wants `multipart/related`, which reqwest's form
/// support does not produce; the two-part body is assembled by hand.
fn multipart_related_body(metadata: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + metadata.len() + 256);
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!("--{MULTIPART_BOUNDARY}\r\nContent-Type: application/pdf\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

#[derive(Deserialize)]
struct DriveCredentials {
    access_token: String,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

/// Google Drive storage provider.
pub struct DriveProvider {
    client: reqwest::Client,
    api_base: String,
    upload_base: String,
}

impl Default for DriveProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DriveProvider {
    pub fn new() -> Self {
        Self::with_base_urls(API_BASE, UPLOAD_BASE)
    }

    /// Point the client at different endpoints (tests, mock servers).
    pub fn with_base_urls(api_base: impl Into<String>, upload_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            upload_base: upload_base.into(),
        }
    }

    /// Send a request, retrying transient statuses on the fixed delay table.
    async fn execute<F>(&self, build: F) -> Result<reqwest::Response, StorageError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut delays = TRANSIENT_RETRY_DELAYS.iter();
        loop {
            let response = build().send().await?;
            let status = response.status().as_u16();
            if is_transient(status) {
                if let Some(delay) = delays.next() {
                    warn!(status, delay_secs = delay.as_secs(), "transient provider error, retrying");
                    tokio::time::sleep(*delay).await;
                    continue;
                }
            }
            return Ok(response);
        }
    }

    /// Find a child of `parent` by exact name, optionally restricted by MIME type.
    async fn find_child(
        &self,
        token: &str,
        parent: &str,
        name: &str,
        mime_type: Option<&str>,
    ) -> Result<Option<DriveFile>, StorageError> {
        let mut q = format!(
            "name = '{}' and '{}' in parents and trashed = false",
            escape_query_term(name),
            escape_query_term(parent),
        );
        if let Some(mime) = mime_type {
            q.push_str(&format!(" and mimeType = '{}'", mime));
        }

        let response = self
            .execute(|| {
                self.client
                    .get(format!("{}/files", self.api_base))
                    .bearer_auth(token)
                    .query(&[("q", q.as_str()), ("fields", "files(id)"), ("pageSize", "1")])
            })
            .await?;
        let response = check(response).await?;
        let list: FileList = response.json().await?;
        Ok(list.files.into_iter().next())
    }

    /// Create a folder under `parent`, returning its id.
    async fn create_folder(
        &self,
        token: &str,
        parent: &str,
        name: &str,
    ) -> Result<DriveFile, StorageError> {
        let body = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME,
            "parents": [parent],
        });

        let response = self
            .execute(|| {
                self.client
                    .post(format!("{}/files", self.api_base))
                    .bearer_auth(token)
                    .query(&[("fields", "id")])
                    .json(&body)
            })
            .await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    async fn do_upload(&self, request: &UploadRequest<'_>) -> Result<UploadOutcome, StorageError> {
        let credentials: DriveCredentials = serde_json::from_str(request.credentials)
            .map_err(|e| StorageError::Credentials(e.to_string()))?;
        if credentials.access_token.trim().is_empty() {
            return Err(StorageError::Credentials("empty access token".to_string()));
        }
        let token = &credentials.access_token;

        // Per-record subfolder beneath the tenant root, created on demand.
        let folder = match self
            .find_child(token, request.root_folder_id, request.folder_name, Some(FOLDER_MIME))
            .await?
        {
            Some(folder) => folder,
            None => {
                debug!(folder = request.folder_name, "creating destination folder");
                self.create_folder(token, request.root_folder_id, request.folder_name)
                    .await?
            }
        };

        // A same-named file already there means a prior attempt finished.
        if let Some(existing) = self
            .find_child(token, &folder.id, request.file_name, None)
            .await?
        {
            return Ok(UploadOutcome {
                status: crate::models::UploadStatus::Skipped,
                message: format!("file '{}' already present", request.file_name),
                file_id: Some(existing.id),
                folder_id: Some(folder.id),
            });
        }

        let metadata = serde_json::json!({
            "name": request.file_name,
            "parents": [folder.id.as_str()],
        })
        .to_string();
        let body = multipart_related_body(&metadata, request.content);

        let response = self
            .execute(|| {
                self.client
                    .post(format!("{}/files", self.upload_base))
                    .bearer_auth(token)
                    .query(&[("uploadType", "multipart"), ("fields", "id")])
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
                    )
                    .body(body.clone())
            })
            .await?;
        let response = check(response).await?;
        let uploaded: DriveFile = response.json().await?;

        Ok(UploadOutcome::uploaded(
            format!("uploaded '{}'", request.file_name),
            uploaded.id,
            folder.id,
        ))
    }
}

/// Reject non-success responses with the provider's own words.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message: String = body.chars().take(300).collect::<String>().trim().to_string();
    Err(StorageError::Provider {
        status: status.as_u16(),
        message,
    })
}

#[async_trait::async_trait]
impl StorageProvider for DriveProvider {
    fn name(&self) -> &'static str {
        PROVIDER_GOOGLE_DRIVE
    }

    async fn upload(&self, request: UploadRequest<'_>) -> Result<UploadOutcome, StorageError> {
        match self.do_upload(&request).await {
            Ok(outcome) => Ok(outcome),
            // HTTP-level rejections (including exhausted transient retries)
            // are failed attempts for the queue to reschedule, not crashes.
            Err(StorageError::Provider { status, message }) => Ok(UploadOutcome::failed(format!(
                "drive returned HTTP {}: {}",
                status, message
            ))),
            Err(other) => Err(other),
        }
    }
}
