//! Diesel ORM models for database tables.
//!
//! These models provide compile-time type checking for database operations.
//! Timestamps are stored as RFC 3339 text, status enums as text, booleans as
//! integers.

use diesel::prelude::*;

use crate::schema;

/// Organization record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::organizations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrganizationRecord {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// New organization for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::organizations)]
pub struct NewOrganization<'a> {
    pub name: &'a str,
    pub created_at: &'a str,
}

/// Evaluation record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::evaluations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EvaluationRecord {
    pub id: i64,
    pub organization_id: i64,
    pub employee_name: String,
    pub period: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// New evaluation for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::evaluations)]
pub struct NewEvaluation<'a> {
    pub organization_id: i64,
    pub employee_name: &'a str,
    pub period: &'a str,
    pub status: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Tenant integration record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::tenant_integrations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TenantIntegrationRecord {
    pub id: i64,
    pub organization_id: i64,
    pub provider: String,
    pub is_connected: i32,
    pub is_enabled: i32,
    pub credentials: Option<String>,
    pub root_folder_id: Option<String>,
    pub updated_at: String,
}

/// New tenant integration for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::tenant_integrations)]
pub struct NewTenantIntegration<'a> {
    pub organization_id: i64,
    pub provider: &'a str,
    pub is_connected: i32,
    pub is_enabled: i32,
    pub credentials: Option<&'a str>,
    pub root_folder_id: Option<&'a str>,
    pub updated_at: &'a str,
}

/// Upload job record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::upload_jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UploadJobRecord {
    pub id: i64,
    pub organization_id: i64,
    pub evaluation_id: i64,
    pub provider: String,
    pub state: String,
    pub attempt_count: i32,
    pub created_at: String,
    pub next_attempt_at: Option<String>,
    pub processing_started_at: Option<String>,
    pub last_message: Option<String>,
    pub last_file_id: Option<String>,
    pub last_folder_id: Option<String>,
}

/// New upload job for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::upload_jobs)]
pub struct NewUploadJob<'a> {
    pub organization_id: i64,
    pub evaluation_id: i64,
    pub provider: &'a str,
    pub state: &'a str,
    pub attempt_count: i32,
    pub created_at: &'a str,
    pub next_attempt_at: Option<&'a str>,
    pub processing_started_at: Option<&'a str>,
    pub last_message: Option<&'a str>,
    pub last_file_id: Option<&'a str>,
    pub last_folder_id: Option<&'a str>,
}

/// Upload log record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::upload_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UploadLogRecord {
    pub id: i64,
    pub organization_id: i64,
    pub evaluation_id: i64,
    pub provider: String,
    pub status: String,
    pub message: String,
    pub file_id: Option<String>,
    pub folder_id: Option<String>,
    pub attempt_number: i32,
    pub created_at: String,
}

/// New upload log row for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::upload_logs)]
pub struct NewUploadLog<'a> {
    pub organization_id: i64,
    pub evaluation_id: i64,
    pub provider: &'a str,
    pub status: &'a str,
    pub message: &'a str,
    pub file_id: Option<&'a str>,
    pub folder_id: Option<&'a str>,
    pub attempt_number: i32,
    pub created_at: &'a str,
}
