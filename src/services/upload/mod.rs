//! Upload worker service.
//!
//! A single polling loop drives the queue: each cycle reclaims stale
//! in-flight jobs, claims a small batch of due work, and runs every claimed
//! job through the gating pipeline. Jobs in a batch are processed
//! sequentially; rows are disjoint per (organization, evaluation, provider),
//! so nothing contends.

mod direct;
mod pipeline;
mod types;

pub use direct::upload_now;
pub use types::{Resolution, WorkerConfig};

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::{JobState, UploadJob};
use crate::render::ArtifactRenderer;
use crate::repository::{EvaluationRepository, IntegrationRepository, UploadQueueRepository};
use crate::storage::StorageProvider;

use pipeline::PipelineContext;

/// The continuously-running upload worker.
pub struct UploadWorker {
    queue: UploadQueueRepository,
    evaluations: EvaluationRepository,
    integrations: IntegrationRepository,
    renderer: Arc<dyn ArtifactRenderer>,
    provider: Arc<dyn StorageProvider>,
    config: WorkerConfig,
}

impl UploadWorker {
    pub fn new(
        queue: UploadQueueRepository,
        evaluations: EvaluationRepository,
        integrations: IntegrationRepository,
        renderer: Arc<dyn ArtifactRenderer>,
        provider: Arc<dyn StorageProvider>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            queue,
            evaluations,
            integrations,
            renderer,
            provider,
            config,
        }
    }

    /// Run until `shutdown` flips to true.
    ///
    /// Loop-level errors (the store being unreachable, say) are logged and
    /// followed by a pause; job-level trouble never reaches this far because
    /// every pipeline outcome is converted into a job transition first.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(provider = self.provider.name(), "upload worker started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let pause = match self.poll_once().await {
                Ok(0) => self.config.poll_interval,
                Ok(processed) => {
                    debug!(processed, "processed batch");
                    // More work may already be due.
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "poll cycle failed");
                    self.config.error_pause
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = shutdown.changed() => {}
            }
        }

        info!("upload worker stopped");
    }

    /// One poll cycle: reclaim stale jobs, claim due work, process it.
    /// Returns the number of jobs processed.
    pub async fn poll_once(&self) -> anyhow::Result<usize> {
        let reclaimed = self.queue.reclaim_stale(self.config.stale_after).await?;
        if reclaimed > 0 {
            info!(reclaimed, "reset stale in-flight jobs");
        }

        let jobs = self.queue.claim_due(self.config.batch_size).await?;
        let claimed = jobs.len();
        for job in jobs {
            self.process(job).await?;
        }

        Ok(claimed)
    }

    /// Run one claimed job through the pipeline and persist the transition.
    async fn process(&self, job: UploadJob) -> anyhow::Result<()> {
        let ctx = PipelineContext {
            evaluations: &self.evaluations,
            integrations: &self.integrations,
            renderer: &self.renderer,
            provider: &self.provider,
        };

        let resolution = pipeline::run(&ctx, job.organization_id, job.evaluation_id).await;
        match resolution {
            Resolution::Uploaded {
                message,
                file_id,
                folder_id,
            } => {
                self.queue
                    .record_success(&job, &message, file_id.as_deref(), folder_id.as_deref())
                    .await?;
                info!(job = job.id, attempt = job.attempt_count, "upload succeeded");
            }
            Resolution::Skipped {
                message,
                file_id,
                folder_id,
            } => {
                self.queue
                    .record_skip(&job, &message, file_id.as_deref(), folder_id.as_deref())
                    .await?;
                info!(job = job.id, reason = %message, "upload skipped");
            }
            Resolution::IntegrityFailure { message } => {
                self.queue.record_terminal_failure(&job, &message).await?;
                warn!(job = job.id, reason = %message, "upload failed terminally");
            }
            Resolution::AttemptFailure { message } => {
                let state = self
                    .queue
                    .record_attempt_failure(&job, &message, self.config.max_attempts)
                    .await?;
                match state {
                    JobState::Retrying => warn!(
                        job = job.id,
                        attempt = job.attempt_count,
                        reason = %message,
                        "attempt failed, retry scheduled"
                    ),
                    _ => warn!(
                        job = job.id,
                        attempt = job.attempt_count,
                        reason = %message,
                        "attempts exhausted, job failed"
                    ),
                }
            }
        }

        Ok(())
    }
}
