//! Worker command.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::config::Settings;
use crate::render::{ArtifactRenderer, SummaryRenderer};
use crate::repository::{
    DbPool, EvaluationRepository, IntegrationRepository, UploadQueueRepository,
};
use crate::services::upload::UploadWorker;
use crate::storage::drive::DriveProvider;
use crate::storage::StorageProvider;

/// Run the upload worker until Ctrl-C.
pub async fn cmd_work(settings: &Settings) -> anyhow::Result<()> {
    let pool = DbPool::from_path(&settings.database_path());
    let renderer: Arc<dyn ArtifactRenderer> = Arc::new(SummaryRenderer);
    let provider: Arc<dyn StorageProvider> = Arc::new(DriveProvider::new());

    let worker = UploadWorker::new(
        UploadQueueRepository::new(pool.clone()),
        EvaluationRepository::new(pool.clone()),
        IntegrationRepository::new(pool),
        renderer,
        provider,
        settings.worker_config(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    worker.run(shutdown_rx).await;
    Ok(())
}
