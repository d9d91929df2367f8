//! Idempotent enqueue and resurrection.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::UploadQueueRepository;
use crate::models::JobState;
use crate::repository::diesel_models::{NewUploadJob, UploadJobRecord};
use crate::repository::pool::DieselError;
use crate::repository::util::LastInsertRowId;
use crate::schema::upload_jobs;

impl UploadQueueRepository {
    /// Create or resurrect the queue item for one
    /// (organization, evaluation, provider) triple.
    ///
    /// A `succeeded` row is returned unchanged so a completed artifact is
    /// never re-uploaded. Any other existing row is reset to `queued` and
    /// due immediately; its attempt history is preserved, so a resurrected
    /// job continues the backoff curve where it left off.
    pub async fn enqueue_or_requeue(
        &self,
        organization_id: i64,
        evaluation_id: i64,
        provider: &str,
        reason: Option<&str>,
    ) -> Result<i64, DieselError> {
        let provider = provider.to_string();
        let reason = reason.map(|r| r.to_string());
        let now = Utc::now().to_rfc3339();
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            Box::pin(async move {
                let existing: Option<UploadJobRecord> = upload_jobs::table
                    .filter(upload_jobs::organization_id.eq(organization_id))
                    .filter(upload_jobs::evaluation_id.eq(evaluation_id))
                    .filter(upload_jobs::provider.eq(&provider))
                    .first(conn)
                    .await
                    .optional()?;

                match existing {
                    Some(record) if record.state == JobState::Succeeded.as_str() => Ok(record.id),
                    Some(record) => {
                        let message = match &reason {
                            Some(r) => format!("re-queued: {}", r),
                            None => "re-queued".to_string(),
                        };
                        diesel::update(upload_jobs::table.find(record.id))
                            .set((
                                upload_jobs::state.eq(JobState::Queued.as_str()),
                                upload_jobs::next_attempt_at.eq(Some(now.as_str())),
                                upload_jobs::processing_started_at.eq(None::<String>),
                                upload_jobs::last_message.eq(Some(message.as_str())),
                            ))
                            .execute(conn)
                            .await?;
                        Ok(record.id)
                    }
                    None => {
                        diesel::insert_into(upload_jobs::table)
                            .values(NewUploadJob {
                                organization_id,
                                evaluation_id,
                                provider: &provider,
                                state: JobState::Queued.as_str(),
                                attempt_count: 0,
                                created_at: &now,
                                next_attempt_at: Some(&now),
                                processing_started_at: None,
                                last_message: None,
                                last_file_id: None,
                                last_folder_id: None,
                            })
                            .execute(conn)
                            .await?;

                        let row: LastInsertRowId =
                            diesel::sql_query("SELECT last_insert_rowid() AS id")
                                .get_result(conn)
                                .await?;
                        Ok(row.id)
                    }
                }
            })
        })
        .await
    }
}
