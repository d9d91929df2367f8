//! Upload history command.

use console::style;

use crate::config::Settings;
use crate::models::UploadStatus;
use crate::repository::{DbPool, UploadQueueRepository};

/// Show the upload audit trail for an evaluation, newest first.
pub async fn cmd_history(
    settings: &Settings,
    org: i64,
    evaluation: i64,
    limit: u32,
) -> anyhow::Result<()> {
    let pool = DbPool::from_path(&settings.database_path());
    let queue = UploadQueueRepository::new(pool);

    let logs = queue.logs_for_record(org, evaluation, limit).await?;
    if logs.is_empty() {
        println!("No upload attempts recorded for evaluation {}", evaluation);
        return Ok(());
    }

    for entry in logs {
        let mark = match entry.status {
            UploadStatus::Uploaded => style("✓").green(),
            UploadStatus::Skipped => style("-").yellow(),
            UploadStatus::Failed => style("✗").red(),
        };
        println!(
            "{} [{}] attempt {} {}: {}",
            mark,
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.attempt_number,
            entry.status.as_str(),
            entry.message
        );
    }

    Ok(())
}
