//! Transitions out of `processing`.
//!
//! Every transition writes the job update and its audit row in one
//! transaction, so the audit trail can never disagree with the job state,
//! even across a crash between writes.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::UploadQueueRepository;
use crate::models::{backoff, JobState, UploadJob, UploadStatus};
use crate::repository::diesel_models::NewUploadLog;
use crate::repository::pool::DieselError;
use crate::schema::{upload_jobs, upload_logs};

impl UploadQueueRepository {
    /// The storage provider stored the artifact.
    pub async fn record_success(
        &self,
        job: &UploadJob,
        message: &str,
        file_id: Option<&str>,
        folder_id: Option<&str>,
    ) -> Result<(), DieselError> {
        self.apply_transition(
            job,
            JobState::Succeeded,
            UploadStatus::Uploaded,
            message.to_string(),
            file_id.map(ToString::to_string),
            folder_id.map(ToString::to_string),
            None,
        )
        .await
    }

    /// An expected, permanently-inapplicable condition. Not retried;
    /// re-entry only via re-enqueue.
    pub async fn record_skip(
        &self,
        job: &UploadJob,
        message: &str,
        file_id: Option<&str>,
        folder_id: Option<&str>,
    ) -> Result<(), DieselError> {
        self.apply_transition(
            job,
            JobState::Skipped,
            UploadStatus::Skipped,
            message.to_string(),
            file_id.map(ToString::to_string),
            folder_id.map(ToString::to_string),
            None,
        )
        .await
    }

    /// A data-integrity failure. Retrying cannot fix missing or inconsistent
    /// data, so the job fails terminally on the spot.
    pub async fn record_terminal_failure(
        &self,
        job: &UploadJob,
        message: &str,
    ) -> Result<(), DieselError> {
        self.apply_transition(
            job,
            JobState::Failed,
            UploadStatus::Failed,
            message.to_string(),
            None,
            None,
            Some(Utc::now().to_rfc3339()),
        )
        .await
    }

    /// A render/upload failure for this attempt. Schedules a retry via the
    /// backoff table, or fails terminally once the attempt ceiling is
    /// reached. Returns the resulting state.
    pub async fn record_attempt_failure(
        &self,
        job: &UploadJob,
        message: &str,
        max_attempts: u32,
    ) -> Result<JobState, DieselError> {
        if job.attempt_count >= max_attempts {
            self.apply_transition(
                job,
                JobState::Failed,
                UploadStatus::Failed,
                message.to_string(),
                None,
                None,
                // For failed jobs this column records the terminal attempt time.
                Some(Utc::now().to_rfc3339()),
            )
            .await?;
            Ok(JobState::Failed)
        } else {
            let delay = backoff(job.attempt_count);
            let due = Utc::now() + chrono::Duration::seconds(delay.as_secs() as i64);
            self.apply_transition(
                job,
                JobState::Retrying,
                UploadStatus::Failed,
                message.to_string(),
                None,
                None,
                Some(due.to_rfc3339()),
            )
            .await?;
            Ok(JobState::Retrying)
        }
    }

    /// Update the job row and append the audit row in one transaction.
    #[allow(clippy::too_many_arguments)]
    async fn apply_transition(
        &self,
        job: &UploadJob,
        state: JobState,
        status: UploadStatus,
        message: String,
        file_id: Option<String>,
        folder_id: Option<String>,
        next_attempt_at: Option<String>,
    ) -> Result<(), DieselError> {
        let now = Utc::now().to_rfc3339();
        let job_id = job.id;
        let organization_id = job.organization_id;
        let evaluation_id = job.evaluation_id;
        let provider = job.provider.clone();
        let attempt_number = job.attempt_count as i32;
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            Box::pin(async move {
                diesel::update(upload_jobs::table.find(job_id))
                    .set((
                        upload_jobs::state.eq(state.as_str()),
                        upload_jobs::processing_started_at.eq(None::<String>),
                        upload_jobs::next_attempt_at.eq(next_attempt_at.as_deref()),
                        upload_jobs::last_message.eq(Some(message.as_str())),
                        upload_jobs::last_file_id.eq(file_id.as_deref()),
                        upload_jobs::last_folder_id.eq(folder_id.as_deref()),
                    ))
                    .execute(conn)
                    .await?;

                diesel::insert_into(upload_logs::table)
                    .values(NewUploadLog {
                        organization_id,
                        evaluation_id,
                        provider: &provider,
                        status: status.as_str(),
                        message: &message,
                        file_id: file_id.as_deref(),
                        folder_id: folder_id.as_deref(),
                        attempt_number,
                        created_at: &now,
                    })
                    .execute(conn)
                    .await?;

                Ok(())
            })
        })
        .await
    }
}
