//! Owner credential DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request body for `POST /admin/tenants/{id}/credentials`.
///
/// Without `temporary_secret` a fresh one is generated (rotation).
#[derive(Clone, Default, Deserialize, ToSchema)]
pub struct SendCredentialsRequest {
    #[schema(example = "Maria Rossi")]
    pub owner_name: String,

    /// Defaults to the tenant's contact email.
    #[serde(default)]
    pub owner_email: Option<String>,

    #[serde(default)]
    pub temporary_secret: Option<String>,
}

impl std::fmt::Debug for SendCredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendCredentialsRequest")
            .field("owner_name", &self.owner_name)
            .field("owner_email", &self.owner_email)
            .field(
                "temporary_secret",
                &self.temporary_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl SendCredentialsRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.owner_name.trim().is_empty() {
            return Some("owner_name is required".to_string());
        }
        if let Some(secret) = &self.temporary_secret {
            if secret.chars().count() < 8 {
                return Some("temporary_secret must be at least 8 characters".to_string());
            }
        }
        None
    }
}

/// Receipt for a dispatched credentials email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CredentialDispatch {
    #[schema(example = "maria@lapiazza.test")]
    pub recipient: String,
    pub delivered_at: DateTime<Utc>,
    /// Identifier assigned by the notification channel.
    pub message_id: String,
}

/// Outcome of one probe step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Passed,
    Failed,
}

/// One step of the reversible probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProbeStep {
    #[schema(example = "write_marker")]
    pub name: String,
    pub outcome: StepOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Result of a reversible update probe that completed and reverted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProbeReport {
    pub tenant_id: Uuid,
    pub identity_id: Option<Uuid>,
    pub profile_id: Option<Uuid>,
    pub steps: Vec<ProbeStep>,
}

impl ProbeReport {
    pub fn new(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            identity_id: None,
            profile_id: None,
            steps: Vec::new(),
        }
    }

    pub(crate) fn passed(&mut self, name: &str, detail: Option<String>) {
        self.steps.push(ProbeStep {
            name: name.to_string(),
            outcome: StepOutcome::Passed,
            detail,
        });
    }

    pub(crate) fn failed(&mut self, name: &str, detail: impl Into<String>) {
        self.steps.push(ProbeStep {
            name: name.to_string(),
            outcome: StepOutcome::Failed,
            detail: Some(detail.into()),
        });
    }

    /// `true` if every recorded step passed.
    pub fn all_passed(&self) -> bool {
        self.steps.iter().all(|s| s.outcome == StepOutcome::Passed)
    }
}
