//! Provisioning request validation and response DTOs.

use mise_clients::OnboardingPayload;
use mise_db::models::{ProvisioningRecord, ProvisioningStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::SlugService;

/// Maximum length of a business or owner name.
pub const MAX_NAME_LEN: usize = 100;

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

fn looks_like_phone(value: &str) -> bool {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    (6..=20).contains(&digits)
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.'))
}

/// Validate an onboarding payload before it is sent anywhere.
///
/// Returns the first offending field, None if valid.
pub fn validate_payload(payload: &OnboardingPayload) -> Option<FieldError> {
    let business = &payload.business;
    let name = business.name.trim();
    if name.is_empty() {
        return Some(FieldError::new("business.name", "Business name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Some(FieldError::new(
            "business.name",
            format!("Business name must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    if !SlugService::is_valid_slug(&business.slug) {
        return Some(FieldError::new(
            "business.slug",
            format!("'{}' is not a normalized slug", business.slug),
        ));
    }
    if !looks_like_email(&business.contact_email) {
        return Some(FieldError::new(
            "business.contact_email",
            "Contact email is not a valid address",
        ));
    }
    if let Some(phone) = &business.phone {
        if !looks_like_phone(phone) {
            return Some(FieldError::new("business.phone", "Phone number is not valid"));
        }
    }
    if business.timezone.trim().is_empty() {
        return Some(FieldError::new("business.timezone", "Timezone is required"));
    }

    let owner = &payload.owner;
    let owner_name = owner.full_name.trim();
    if owner_name.is_empty() {
        return Some(FieldError::new("owner.full_name", "Owner name is required"));
    }
    if owner_name.chars().count() > MAX_NAME_LEN {
        return Some(FieldError::new(
            "owner.full_name",
            format!("Owner name must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    if !looks_like_email(&owner.email) {
        return Some(FieldError::new("owner.email", "Owner email is not a valid address"));
    }

    None
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProvisionOutcome {
    /// Tenant created by the provisioning service.
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub tenant_id: Uuid,

    /// Slug the tenant is reachable under.
    #[schema(example = "la-piazza")]
    pub slug: String,
}

/// Request body for failing a stuck provisioning record.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FailRecordRequest {
    /// Why the operator is giving up on the attempt.
    #[schema(example = "Remote service never confirmed; support ticket 4411")]
    pub reason: String,
}

impl FailRecordRequest {
    /// Validate the reason.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Some("Reason is required".to_string());
        }
        if reason.chars().count() > 1000 {
            return Some("Reason must be at most 1000 characters".to_string());
        }
        None
    }
}

/// A provisioning ledger entry as returned by the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningRecordView {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub candidate_slug: String,
    #[schema(value_type = String, example = "pending")]
    pub status: ProvisioningStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&ProvisioningRecord> for ProvisioningRecordView {
    fn from(record: &ProvisioningRecord) -> Self {
        Self {
            id: record.id,
            tenant_id: record.tenant_id,
            candidate_slug: record.candidate_slug.clone(),
            status: record.status,
            error_message: record.error_message.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
