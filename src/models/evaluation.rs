//! Evaluation records and their owning organizations.
//!
//! Evaluations are authored and approved elsewhere; this crate only reads
//! them to decide whether a PDF rendition should be delivered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow status of an evaluation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Draft,
    Submitted,
    Approved,
}

impl EvaluationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            _ => None,
        }
    }
}

/// An employee self-evaluation form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: i64,
    /// Owning tenant.
    pub organization_id: i64,
    pub employee_name: String,
    /// Review period label, e.g. "2025-H1".
    pub period: String,
    pub status: EvaluationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Evaluation {
    /// Human-readable name used for the delivery subfolder and file name.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.employee_name, self.period)
    }

    /// Only approved evaluations are eligible for delivery.
    pub fn is_approved(&self) -> bool {
        self.status == EvaluationStatus::Approved
    }
}

/// Owner reference; loaded alongside the evaluation as proof the tenant row
/// still exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
