//! Audit trail queries and direct-path appends.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::UploadQueueRepository;
use crate::models::{UploadLogEntry, UploadStatus};
use crate::repository::diesel_models::{NewUploadLog, UploadLogRecord};
use crate::repository::pool::DieselError;
use crate::schema::upload_logs;

impl UploadQueueRepository {
    /// Append an audit row outside a job transition.
    ///
    /// Used by the request-triggered upload path, which involves no queue
    /// item; such rows carry attempt number 0.
    #[allow(clippy::too_many_arguments)]
    pub async fn append_log(
        &self,
        organization_id: i64,
        evaluation_id: i64,
        provider: &str,
        status: UploadStatus,
        message: &str,
        file_id: Option<&str>,
        folder_id: Option<&str>,
        attempt_number: u32,
    ) -> Result<(), DieselError> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.pool.get().await?;
        diesel::insert_into(upload_logs::table)
            .values(NewUploadLog {
                organization_id,
                evaluation_id,
                provider,
                status: status.as_str(),
                message,
                file_id,
                folder_id,
                attempt_number: attempt_number as i32,
                created_at: &now,
            })
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Upload history for one record, newest first.
    pub async fn logs_for_record(
        &self,
        organization_id: i64,
        evaluation_id: i64,
        limit: u32,
    ) -> Result<Vec<UploadLogEntry>, DieselError> {
        let limit = limit as i64;
        let mut conn = self.pool.get().await?;
        upload_logs::table
            .filter(upload_logs::organization_id.eq(organization_id))
            .filter(upload_logs::evaluation_id.eq(evaluation_id))
            .order(upload_logs::id.desc())
            .limit(limit)
            .load::<UploadLogRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(UploadLogEntry::from).collect())
    }
}
