//! Enqueue command.

use console::style;

use crate::config::Settings;
use crate::repository::{DbPool, UploadQueueRepository};
use crate::storage::PROVIDER_GOOGLE_DRIVE;

/// Queue an evaluation for upload, resurrecting a terminal job if needed.
pub async fn cmd_enqueue(
    settings: &Settings,
    org: i64,
    evaluation: i64,
    reason: Option<&str>,
) -> anyhow::Result<()> {
    let pool = DbPool::from_path(&settings.database_path());
    let queue = UploadQueueRepository::new(pool);

    let job_id = queue
        .enqueue_or_requeue(org, evaluation, PROVIDER_GOOGLE_DRIVE, reason)
        .await?;

    println!(
        "{} Queued evaluation {} for organization {} (job {})",
        style("✓").green(),
        evaluation,
        org,
        job_id
    );

    Ok(())
}
