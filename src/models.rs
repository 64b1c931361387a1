use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;

// ============ Database Models ============

/// A captured prospect inquiry.
///
/// Rows are insert-only: there is no update path, only creation and
/// administrator deletion.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Lead {
    /// Sequential identifier assigned by the store.
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    /// Inquiry category (e.g. "Residential", "Solar Report Request").
    pub project_type: String,
    pub location: Option<String>,
    /// Free-text message; holds the sizing summary for report requests.
    pub message: Option<String>,
    /// Set when the row is inserted, never modified.
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a `Lead`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLead {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub project_type: String,
    pub location: Option<String>,
    pub message: Option<String>,
}

impl NewLead {
    /// Trims every field, turns blank optionals into `None` and rejects
    /// blank required fields.
    ///
    /// Email is checked for presence only.
    pub fn validated(self) -> Result<Self, AppError> {
        let full_name = required("full_name", self.full_name)?;
        let phone = required("phone", self.phone)?;
        let email = required("email", self.email)?;
        let project_type = required("project_type", self.project_type)?;

        Ok(Self {
            full_name,
            phone,
            email,
            project_type,
            location: optional(self.location),
            message: optional(self.message),
        })
    }
}

fn required(field: &str, value: String) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("Missing required field: {}", field)));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============ API Response Models ============

/// JSON receipt returned for a captured lead when no document is attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureReceipt {
    pub success: bool,
    pub lead_id: i64,
    /// "sent" or "failed".
    pub notification: String,
    /// "rendered", "failed" or "skipped".
    pub document: String,
    /// Human-readable reasons for any degraded step.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Admin lead listing, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadListResponse {
    pub total: i64,
    pub leads: Vec<Lead>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewLead {
        NewLead {
            full_name: "  Asha Verma ".to_string(),
            phone: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
            project_type: "Residential".to_string(),
            location: Some("   ".to_string()),
            message: Some(" Rooftop, 2 floors ".to_string()),
        }
    }

    #[test]
    fn validated_trims_and_drops_blank_optionals() {
        let lead = sample().validated().unwrap();

        assert_eq!(lead.full_name, "Asha Verma");
        assert_eq!(lead.location, None);
        assert_eq!(lead.message.as_deref(), Some("Rooftop, 2 floors"));
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut lead = sample();
        lead.phone = "  ".to_string();

        let err = lead.validated().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg.contains("phone")));
    }

    #[test]
    fn email_is_only_checked_for_presence() {
        let mut lead = sample();
        lead.email = "not-an-email".to_string();

        assert_eq!(lead.validated().unwrap().email, "not-an-email");
    }
}
