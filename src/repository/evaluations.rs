//! Evaluation and organization lookups.
//!
//! The forms themselves are authored by the web application; the pipeline
//! only needs the approval gate and the owner reference, plus enough write
//! surface to provision records from tests and operational tooling.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::diesel_models::{EvaluationRecord, NewEvaluation, NewOrganization, OrganizationRecord};
use super::pool::{DbPool, DieselError};
use super::util::LastInsertRowId;
use super::parse_datetime;
use crate::models::{Evaluation, EvaluationStatus, Organization};
use crate::schema::{evaluations, organizations};

impl From<EvaluationRecord> for Evaluation {
    fn from(record: EvaluationRecord) -> Self {
        Evaluation {
            id: record.id,
            organization_id: record.organization_id,
            employee_name: record.employee_name,
            period: record.period,
            status: EvaluationStatus::from_str(&record.status).unwrap_or(EvaluationStatus::Draft),
            created_at: parse_datetime(&record.created_at),
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

impl From<OrganizationRecord> for Organization {
    fn from(record: OrganizationRecord) -> Self {
        Organization {
            id: record.id,
            name: record.name,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// Read model over evaluations and their owning organizations.
#[derive(Clone)]
pub struct EvaluationRepository {
    pool: DbPool,
}

impl EvaluationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Load an evaluation together with its owning organization.
    ///
    /// Returns `None` when either the record or the owner row is missing;
    /// the caller cannot distinguish the two, and does not need to.
    pub async fn get_with_owner(
        &self,
        evaluation_id: i64,
    ) -> Result<Option<(Evaluation, Organization)>, DieselError> {
        let mut conn = self.pool.get().await?;
        let row: Option<(EvaluationRecord, OrganizationRecord)> = evaluations::table
            .inner_join(organizations::table)
            .filter(evaluations::id.eq(evaluation_id))
            .first(&mut conn)
            .await
            .optional()?;
        Ok(row.map(|(e, o)| (Evaluation::from(e), Organization::from(o))))
    }

    /// Create an organization, returning its id.
    pub async fn create_organization(&self, name: &str) -> Result<i64, DieselError> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.pool.get().await?;
        diesel::insert_into(organizations::table)
            .values(NewOrganization {
                name,
                created_at: &now,
            })
            .execute(&mut conn)
            .await?;
        let row: LastInsertRowId = diesel::sql_query("SELECT last_insert_rowid() AS id")
            .get_result(&mut conn)
            .await?;
        Ok(row.id)
    }

    /// Create an evaluation in the given status, returning its id.
    pub async fn create(
        &self,
        organization_id: i64,
        employee_name: &str,
        period: &str,
        status: EvaluationStatus,
    ) -> Result<i64, DieselError> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.pool.get().await?;
        diesel::insert_into(evaluations::table)
            .values(NewEvaluation {
                organization_id,
                employee_name,
                period,
                status: status.as_str(),
                created_at: &now,
                updated_at: &now,
            })
            .execute(&mut conn)
            .await?;
        let row: LastInsertRowId = diesel::sql_query("SELECT last_insert_rowid() AS id")
            .get_result(&mut conn)
            .await?;
        Ok(row.id)
    }

    /// Move an evaluation to a new workflow status.
    pub async fn set_status(
        &self,
        evaluation_id: i64,
        status: EvaluationStatus,
    ) -> Result<(), DieselError> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.pool.get().await?;
        diesel::update(evaluations::table.find(evaluation_id))
            .set((
                evaluations::status.eq(status.as_str()),
                evaluations::updated_at.eq(&now),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}
