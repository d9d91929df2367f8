//! Initialize command.

use console::style;

use crate::config::Settings;
use crate::repository;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    repository::run_migrations(&settings.database_url()).await?;

    println!(
        "{} Initialized evalsync in {}",
        style("✓").green(),
        settings.data_dir.display()
    );

    Ok(())
}
