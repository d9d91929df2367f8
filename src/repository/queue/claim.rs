//! Due-job claiming and stale-job reclaim.

use std::time::Duration;

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::UploadQueueRepository;
use crate::models::{JobState, UploadJob};
use crate::repository::diesel_models::UploadJobRecord;
use crate::repository::pool::DieselError;
use crate::repository::parse_datetime;
use crate::schema::upload_jobs;

impl UploadQueueRepository {
    /// Reset in-flight jobs whose claim stamp has gone stale.
    ///
    /// The claim is nothing more than the `processing_started_at` timestamp
    /// plus the state; a worker that died mid-job leaves both behind, and
    /// this pass returns such jobs to `retrying`, due immediately. Returns
    /// the number of jobs reclaimed.
    pub async fn reclaim_stale(&self, stale_after: Duration) -> Result<usize, DieselError> {
        let now = Utc::now();
        let cutoff = (now - chrono::Duration::seconds(stale_after.as_secs() as i64)).to_rfc3339();
        let now = now.to_rfc3339();
        let mut conn = self.pool.get().await?;

        diesel::update(
            upload_jobs::table
                .filter(upload_jobs::state.eq_any([
                    JobState::Processing.as_str(),
                    JobState::Retrying.as_str(),
                ]))
                .filter(upload_jobs::processing_started_at.is_not_null())
                .filter(upload_jobs::processing_started_at.lt(&cutoff)),
        )
        .set((
            upload_jobs::state.eq(JobState::Retrying.as_str()),
            upload_jobs::processing_started_at.eq(None::<String>),
            upload_jobs::next_attempt_at.eq(Some(now.as_str())),
            upload_jobs::last_message.eq(Some("reclaimed: processing timed out")),
        ))
        .execute(&mut conn)
        .await
    }

    /// Atomically claim up to `limit` due jobs, oldest due date first.
    ///
    /// Claiming moves each row to `processing`, stamps
    /// `processing_started_at`, and bumps `attempt_count` so the row in
    /// flight carries the attempt number being executed.
    pub async fn claim_due(&self, limit: u32) -> Result<Vec<UploadJob>, DieselError> {
        let limit = limit as i64;
        let now = Utc::now().to_rfc3339();
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            let now = now.clone();
            Box::pin(async move {
                let records: Vec<UploadJobRecord> = upload_jobs::table
                    .filter(upload_jobs::state.eq_any([
                        JobState::Queued.as_str(),
                        JobState::Retrying.as_str(),
                    ]))
                    .filter(upload_jobs::next_attempt_at.le(&now))
                    .order(upload_jobs::next_attempt_at.asc())
                    .limit(limit)
                    .load(conn)
                    .await?;

                let mut claimed = Vec::with_capacity(records.len());
                for record in records {
                    let attempt = record.attempt_count + 1;
                    diesel::update(upload_jobs::table.find(record.id))
                        .set((
                            upload_jobs::state.eq(JobState::Processing.as_str()),
                            upload_jobs::processing_started_at.eq(Some(now.as_str())),
                            upload_jobs::attempt_count.eq(attempt),
                        ))
                        .execute(conn)
                        .await?;

                    let mut job = UploadJob::from(record);
                    job.state = JobState::Processing;
                    job.attempt_count = attempt as u32;
                    job.processing_started_at = Some(parse_datetime(&now));
                    claimed.push(job);
                }

                Ok(claimed)
            })
        })
        .await
    }
}
