//! Request-triggered upload path.
//!
//! Used immediately after a manual approval for responsiveness. Shares the
//! gating pipeline and the audit log with the worker, but involves no queue
//! row and therefore no durability: if this fails, the caller enqueues
//! instead. Tenant and record are explicit parameters; nothing is read from
//! ambient request context.

use std::sync::Arc;

use super::pipeline::{self, PipelineContext};
use super::types::Resolution;
use crate::models::UploadStatus;
use crate::render::ArtifactRenderer;
use crate::repository::{EvaluationRepository, IntegrationRepository, UploadQueueRepository};
use crate::storage::StorageProvider;

/// Upload one evaluation right now, bypassing the queue.
///
/// Writes a single audit row with attempt number 0; worker attempts always
/// number from 1, so direct uploads are distinguishable in the history.
#[allow(clippy::too_many_arguments)]
pub async fn upload_now(
    queue: &UploadQueueRepository,
    evaluations: &EvaluationRepository,
    integrations: &IntegrationRepository,
    renderer: &Arc<dyn ArtifactRenderer>,
    provider: &Arc<dyn StorageProvider>,
    organization_id: i64,
    evaluation_id: i64,
) -> anyhow::Result<Resolution> {
    let ctx = PipelineContext {
        evaluations,
        integrations,
        renderer,
        provider,
    };

    let resolution = pipeline::run(&ctx, organization_id, evaluation_id).await;

    let (status, file_id, folder_id) = match &resolution {
        Resolution::Uploaded {
            file_id, folder_id, ..
        } => (UploadStatus::Uploaded, file_id.clone(), folder_id.clone()),
        Resolution::Skipped {
            file_id, folder_id, ..
        } => (UploadStatus::Skipped, file_id.clone(), folder_id.clone()),
        Resolution::IntegrityFailure { .. } | Resolution::AttemptFailure { .. } => {
            (UploadStatus::Failed, None, None)
        }
    };

    queue
        .append_log(
            organization_id,
            evaluation_id,
            provider.name(),
            status,
            resolution.message(),
            file_id.as_deref(),
            folder_id.as_deref(),
            0,
        )
        .await?;

    Ok(resolution)
}
