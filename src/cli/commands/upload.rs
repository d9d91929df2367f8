//! Direct upload command.

use std::sync::Arc;

use console::style;

use crate::config::Settings;
use crate::render::{ArtifactRenderer, SummaryRenderer};
use crate::repository::{
    DbPool, EvaluationRepository, IntegrationRepository, UploadQueueRepository,
};
use crate::services::upload::{upload_now, Resolution};
use crate::storage::drive::DriveProvider;
use crate::storage::StorageProvider;

/// Upload one evaluation immediately, bypassing the queue.
pub async fn cmd_upload(settings: &Settings, org: i64, evaluation: i64) -> anyhow::Result<()> {
    let pool = DbPool::from_path(&settings.database_path());
    let queue = UploadQueueRepository::new(pool.clone());
    let evaluations = EvaluationRepository::new(pool.clone());
    let integrations = IntegrationRepository::new(pool);
    let renderer: Arc<dyn ArtifactRenderer> = Arc::new(SummaryRenderer);
    let provider: Arc<dyn StorageProvider> = Arc::new(DriveProvider::new());

    let resolution = upload_now(
        &queue,
        &evaluations,
        &integrations,
        &renderer,
        &provider,
        org,
        evaluation,
    )
    .await?;

    let mark = match &resolution {
        Resolution::Uploaded { .. } => style("✓").green(),
        Resolution::Skipped { .. } => style("-").yellow(),
        _ => style("✗").red(),
    };
    println!("{} {}: {}", mark, resolution.label(), resolution.message());

    Ok(())
}
