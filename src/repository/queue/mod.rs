//! Upload queue repository.
//!
//! Owns the `upload_jobs` state machine rows and the append-only
//! `upload_logs` audit trail. Split into submodules:
//! - `mod.rs` (this file): Main struct, From impls, lookups
//! - `enqueue.rs`: Idempotent enqueue/resurrect
//! - `claim.rs`: Due-job claiming and stale reclaim
//! - `complete.rs`: Transitions out of processing (job update + audit row)
//! - `logs.rs`: Audit trail queries and direct-path appends
//! - `stats.rs`: Queue statistics

mod claim;
mod complete;
mod enqueue;
mod logs;
mod stats;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

pub use stats::QueueStats;

use super::diesel_models::{UploadJobRecord, UploadLogRecord};
use super::pool::{DbPool, DieselError};
use super::{parse_datetime, parse_datetime_opt};
use crate::models::{JobState, UploadJob, UploadLogEntry, UploadStatus};
use crate::schema::upload_jobs;

impl From<UploadJobRecord> for UploadJob {
    fn from(record: UploadJobRecord) -> Self {
        UploadJob {
            id: record.id,
            organization_id: record.organization_id,
            evaluation_id: record.evaluation_id,
            provider: record.provider,
            state: JobState::from_str(&record.state).unwrap_or(JobState::Queued),
            attempt_count: record.attempt_count.max(0) as u32,
            created_at: parse_datetime(&record.created_at),
            next_attempt_at: parse_datetime_opt(record.next_attempt_at),
            processing_started_at: parse_datetime_opt(record.processing_started_at),
            last_message: record.last_message,
            last_file_id: record.last_file_id,
            last_folder_id: record.last_folder_id,
        }
    }
}

impl From<UploadLogRecord> for UploadLogEntry {
    fn from(record: UploadLogRecord) -> Self {
        UploadLogEntry {
            id: record.id,
            organization_id: record.organization_id,
            evaluation_id: record.evaluation_id,
            provider: record.provider,
            status: UploadStatus::from_str(&record.status).unwrap_or(UploadStatus::Failed),
            message: record.message,
            file_id: record.file_id,
            folder_id: record.folder_id,
            attempt_number: record.attempt_number.max(0) as u32,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// Repository over upload jobs and their audit trail.
#[derive(Clone)]
pub struct UploadQueueRepository {
    pool: DbPool,
}

impl UploadQueueRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Look up the job for one (organization, evaluation, provider) triple.
    pub async fn get(
        &self,
        organization_id: i64,
        evaluation_id: i64,
        provider: &str,
    ) -> Result<Option<UploadJob>, DieselError> {
        let mut conn = self.pool.get().await?;
        upload_jobs::table
            .filter(upload_jobs::organization_id.eq(organization_id))
            .filter(upload_jobs::evaluation_id.eq(evaluation_id))
            .filter(upload_jobs::provider.eq(provider))
            .first::<UploadJobRecord>(&mut conn)
            .await
            .optional()
            .map(|r| r.map(UploadJob::from))
    }

    /// Look up a job by row id.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<UploadJob>, DieselError> {
        let mut conn = self.pool.get().await?;
        upload_jobs::table
            .find(id)
            .first::<UploadJobRecord>(&mut conn)
            .await
            .optional()
            .map(|r| r.map(UploadJob::from))
    }
}
