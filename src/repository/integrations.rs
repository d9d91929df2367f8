//! Tenant integration configuration access.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::diesel_models::{NewTenantIntegration, TenantIntegrationRecord};
use super::pool::{DbPool, DieselError};
use super::parse_datetime;
use crate::models::TenantIntegration;
use crate::schema::tenant_integrations;

impl From<TenantIntegrationRecord> for TenantIntegration {
    fn from(record: TenantIntegrationRecord) -> Self {
        TenantIntegration {
            id: record.id,
            organization_id: record.organization_id,
            provider: record.provider,
            is_connected: record.is_connected != 0,
            is_enabled: record.is_enabled != 0,
            credentials: record.credentials,
            root_folder_id: record.root_folder_id,
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

/// Per-tenant provider configuration store.
#[derive(Clone)]
pub struct IntegrationRepository {
    pool: DbPool,
}

impl IntegrationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Look up the integration for one (organization, provider) pair.
    pub async fn get(
        &self,
        organization_id: i64,
        provider: &str,
    ) -> Result<Option<TenantIntegration>, DieselError> {
        let mut conn = self.pool.get().await?;
        tenant_integrations::table
            .filter(tenant_integrations::organization_id.eq(organization_id))
            .filter(tenant_integrations::provider.eq(provider))
            .first::<TenantIntegrationRecord>(&mut conn)
            .await
            .optional()
            .map(|r| r.map(TenantIntegration::from))
    }

    /// Insert or replace the integration row for a tenant.
    pub async fn upsert(
        &self,
        organization_id: i64,
        provider: &str,
        is_connected: bool,
        is_enabled: bool,
        credentials: Option<&str>,
        root_folder_id: Option<&str>,
    ) -> Result<(), DieselError> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.pool.get().await?;
        diesel::replace_into(tenant_integrations::table)
            .values(NewTenantIntegration {
                organization_id,
                provider,
                is_connected: is_connected as i32,
                is_enabled: is_enabled as i32,
                credentials,
                root_folder_id,
                updated_at: &now,
            })
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}
