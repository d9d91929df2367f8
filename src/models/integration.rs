//! Per-tenant storage provider configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connection settings for one (organization, provider) pair.
///
/// Credentials are an opaque JSON blob owned by the provider client;
/// encryption at rest is handled outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantIntegration {
    pub id: i64,
    pub organization_id: i64,
    pub provider: String,
    pub is_connected: bool,
    pub is_enabled: bool,
    pub credentials: Option<String>,
    /// Provider-side folder all of this tenant's uploads land under.
    pub root_folder_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TenantIntegration {
    pub fn has_credentials(&self) -> bool {
        self.credentials
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
    }

    /// Destination root, if one is configured.
    pub fn destination_root(&self) -> Option<&str> {
        self.root_folder_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}
