//! Queue status command.

use console::style;

use crate::config::Settings;
use crate::repository::{DbPool, UploadQueueRepository};

/// Show queue counts by state.
pub async fn cmd_status(settings: &Settings, org: Option<i64>) -> anyhow::Result<()> {
    let pool = DbPool::from_path(&settings.database_path());
    let queue = UploadQueueRepository::new(pool);

    let stats = queue.counts_by_state(org).await?;

    match org {
        Some(org) => println!("Upload queue for organization {}:", org),
        None => println!("Upload queue:"),
    }
    println!("  queued      {}", stats.queued);
    println!("  processing  {}", stats.processing);
    println!("  retrying    {}", stats.retrying);
    println!("  succeeded   {}", style(stats.succeeded).green());
    println!("  failed      {}", style(stats.failed).red());
    println!("  skipped     {}", stats.skipped);
    if stats.cancelled > 0 {
        println!("  cancelled   {}", stats.cancelled);
    }
    println!("  total       {}", stats.total());

    Ok(())
}
