//! Queue statistics.

use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};

use super::UploadQueueRepository;
use crate::repository::pool::DieselError;
use crate::schema::upload_jobs;

/// Job counts by state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStats {
    pub queued: u64,
    pub processing: u64,
    pub retrying: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
    pub cancelled: u64,
}

impl QueueStats {
    pub fn total(&self) -> u64 {
        self.queued
            + self.processing
            + self.retrying
            + self.succeeded
            + self.failed
            + self.skipped
            + self.cancelled
    }

    /// Jobs the worker will still act on.
    pub fn pending(&self) -> u64 {
        self.queued + self.processing + self.retrying
    }
}

impl UploadQueueRepository {
    /// Count jobs by state, optionally scoped to one organization.
    pub async fn counts_by_state(
        &self,
        organization_id: Option<i64>,
    ) -> Result<QueueStats, DieselError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<(String, i64)> = match organization_id {
            Some(org) => {
                upload_jobs::table
                    .filter(upload_jobs::organization_id.eq(org))
                    .group_by(upload_jobs::state)
                    .select((upload_jobs::state, count_star()))
                    .load(&mut conn)
                    .await?
            }
            None => {
                upload_jobs::table
                    .group_by(upload_jobs::state)
                    .select((upload_jobs::state, count_star()))
                    .load(&mut conn)
                    .await?
            }
        };

        let mut stats = QueueStats::default();
        for (state, count) in rows {
            let count = count.max(0) as u64;
            match state.as_str() {
                "queued" => stats.queued = count,
                "processing" => stats.processing = count,
                "retrying" => stats.retrying = count,
                "succeeded" => stats.succeeded = count,
                "failed" => stats.failed = count,
                "skipped" => stats.skipped = count,
                "cancelled" => stats.cancelled = count,
                _ => {}
            }
        }

        Ok(stats)
    }
}
