//! The per-job gating and processing pipeline.
//!
//! Checks run in a fixed order and short-circuit on the first that fails;
//! the messages are stable strings the audit trail keys on. Approval is
//! checked before integration configuration, so a premature enqueue reads
//! as "not approved yet" rather than a configuration complaint.

use std::sync::Arc;

use tracing::debug;

use super::types::Resolution;
use crate::models::UploadStatus;
use crate::render::ArtifactRenderer;
use crate::repository::{sanitize_name, EvaluationRepository, IntegrationRepository};
use crate::storage::{StorageProvider, UploadRequest};

/// Collaborators the pipeline reads from; shared by the worker and the
/// request-triggered path.
pub(crate) struct PipelineContext<'a> {
    pub evaluations: &'a EvaluationRepository,
    pub integrations: &'a IntegrationRepository,
    pub renderer: &'a Arc<dyn ArtifactRenderer>,
    pub provider: &'a Arc<dyn StorageProvider>,
}

/// Run the ordered gates and, when all pass, render and upload.
pub(crate) async fn run(
    ctx: &PipelineContext<'_>,
    organization_id: i64,
    evaluation_id: i64,
) -> Resolution {
    // Record and owner. A persistence hiccup is retryable; an absent row is not.
    let loaded = match ctx.evaluations.get_with_owner(evaluation_id).await {
        Ok(loaded) => loaded,
        Err(e) => {
            return Resolution::AttemptFailure {
                message: format!("loading record: {}", e),
            }
        }
    };
    let Some((evaluation, _owner)) = loaded else {
        return Resolution::IntegrityFailure {
            message: "record or owner missing".to_string(),
        };
    };

    // A job whose tenant disagrees with the record is stale or forged.
    if evaluation.organization_id != organization_id {
        return Resolution::IntegrityFailure {
            message: "tenant mismatch".to_string(),
        };
    }

    if !evaluation.is_approved() {
        return Resolution::skipped("not approved yet");
    }

    let integration = match ctx.integrations.get(organization_id, ctx.provider.name()).await {
        Ok(integration) => integration,
        Err(e) => {
            return Resolution::AttemptFailure {
                message: format!("loading integration: {}", e),
            }
        }
    };
    let Some(integration) = integration else {
        return Resolution::skipped("no integration configured");
    };
    if !integration.is_connected || !integration.has_credentials() {
        return Resolution::skipped("not connected");
    }
    if !integration.is_enabled {
        return Resolution::skipped("upload disabled for tenant");
    }
    let Some(root_folder_id) = integration.destination_root().map(ToString::to_string) else {
        return Resolution::skipped("no destination configured");
    };

    // Render off the polling loop; a slow engine must not stall other jobs.
    let renderer = Arc::clone(ctx.renderer);
    let record = evaluation.clone();
    let content = match tokio::task::spawn_blocking(move || renderer.render(&record)).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            return Resolution::AttemptFailure {
                message: format!("render failed: {}", e),
            }
        }
        Err(e) => {
            return Resolution::AttemptFailure {
                message: format!("render task failed: {}", e),
            }
        }
    };

    let folder_name = sanitize_name(&evaluation.display_name());
    let file_name = format!("{}.pdf", folder_name);
    debug!(evaluation = evaluation.id, folder = %folder_name, "uploading artifact");

    let request = UploadRequest {
        credentials: integration.credentials.as_deref().unwrap_or_default(),
        root_folder_id: &root_folder_id,
        folder_name: &folder_name,
        file_name: &file_name,
        content: &content,
    };

    match ctx.provider.upload(request).await {
        Ok(outcome) => match outcome.status {
            UploadStatus::Uploaded => Resolution::Uploaded {
                message: outcome.message,
                file_id: outcome.file_id,
                folder_id: outcome.folder_id,
            },
            UploadStatus::Skipped => Resolution::Skipped {
                message: outcome.message,
                file_id: outcome.file_id,
                folder_id: outcome.folder_id,
            },
            UploadStatus::Failed => Resolution::AttemptFailure {
                message: outcome.message,
            },
        },
        Err(e) => Resolution::AttemptFailure {
            message: format!("upload failed: {}", e),
        },
    }
}
