//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking
//! against a SQLite backend.

pub mod diesel_models;
pub mod evaluations;
pub mod integrations;
pub mod migrations;
pub mod pool;
pub mod queue;
mod util;

pub use evaluations::EvaluationRepository;
pub use integrations::IntegrationRepository;
pub use migrations::run_migrations;
pub use pool::{DbPool, DieselError};
pub use queue::{QueueStats, UploadQueueRepository};
pub use util::sanitize_name;

use chrono::{DateTime, Utc};

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string from the database.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}
