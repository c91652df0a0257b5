//! Error types for the tenant onboarding core.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mise_clients::ClientError;
use mise_core::{ProfileId, Severity, TenantId};
use mise_db::DbError;
use serde::Serialize;
use thiserror::Error;

/// Result alias for onboarding operations.
pub type TenantResult<T> = Result<T, TenantError>;

/// Errors that can occur during slug allocation, provisioning, reconciliation
/// and credential operations.
#[derive(Debug, Error)]
pub enum TenantError {
    /// Validation error naming the offending field.
    #[error("{message}")]
    ValidationWithField { field: String, message: String },

    /// Simple validation error (string only).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The candidate slug is already claimed by a tenant or a ledger entry.
    #[error("Slug '{slug}' is unavailable: {reason}")]
    SlugUnavailable { slug: String, reason: String },

    /// The store rejected the slug at creation time (lost the race).
    ///
    /// Recoverable: re-allocate and resubmit.
    #[error("Slug '{slug}' was taken: {message}")]
    SlugTaken { slug: String, message: String },

    /// Every suffix for a base slug is in use.
    #[error("No free slug for '{base}' after {attempts} suffix attempts")]
    AllocationExhausted { base: String, attempts: u32 },

    /// A store or remote service could not be reached or timed out.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Structured error returned by the remote provisioning service.
    #[error("Remote error ({code}): {message}")]
    Remote { code: String, message: String },

    /// The notification channel rejected a credentials email.
    #[error("Notification failed ({status}): {body}")]
    Notification { status: u16, body: String },

    /// Resource not found with specific message.
    #[error("{0}")]
    NotFound(String),

    /// Tenant not found with specific tenant ID.
    #[error("Tenant {0} not found")]
    TenantNotFound(TenantId),

    /// General conflict error (e.g., record no longer pending).
    #[error("{0}")]
    Conflict(String),

    /// The original value of a reversible probe could not be restored.
    ///
    /// The profile is left holding a probe marker and needs manual repair.
    #[error("Revert failed for profile {profile_id}: {reason}")]
    RevertFailed {
        profile_id: ProfileId,
        reason: String,
        /// Failure that happened before the revert, if any.
        earlier: Option<String>,
    },

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response format for API errors.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl TenantError {
    /// Create a validation error for a specific field.
    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationWithField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Severity of this error for operator triage.
    pub fn severity(&self) -> Severity {
        match self {
            TenantError::ValidationWithField { .. }
            | TenantError::Validation(_)
            | TenantError::SlugUnavailable { .. }
            | TenantError::SlugTaken { .. }
            | TenantError::NotFound(_)
            | TenantError::TenantNotFound(_)
            | TenantError::Conflict(_) => Severity::Low,
            TenantError::AllocationExhausted { .. }
            | TenantError::Unavailable(_)
            | TenantError::Database(_)
            | TenantError::Remote { .. }
            | TenantError::Notification { .. }
            | TenantError::Internal(_) => Severity::Medium,
            TenantError::RevertFailed { .. } => Severity::Critical,
        }
    }

    /// `true` when retrying (possibly after re-allocating a slug) can succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TenantError::SlugTaken { .. }
                | TenantError::SlugUnavailable { .. }
                | TenantError::Unavailable(_)
        )
    }
}

impl From<DbError> for TenantError {
    fn from(err: DbError) -> Self {
        if err.is_connection_error() {
            TenantError::Unavailable(err.to_string())
        } else {
            TenantError::Database(err.to_string())
        }
    }
}

impl From<ClientError> for TenantError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Timeout(_) | ClientError::Transport(_) => {
                TenantError::Unavailable(err.to_string())
            }
            ClientError::AuthError(msg) => TenantError::Remote {
                code: "unauthorized".to_string(),
                message: msg,
            },
            ClientError::NotFound(msg) => TenantError::NotFound(msg),
            ClientError::Conflict { code, message } | ClientError::Remote { code, message, .. } => {
                TenantError::Remote { code, message }
            }
            ClientError::InvalidConfig(_) | ClientError::ParseError(_) => {
                TenantError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for TenantError {
    fn into_response(self) -> Response {
        let (status, error_code, message, field) = match &self {
            TenantError::ValidationWithField { field, message } => (
                StatusCode::BAD_REQUEST,
                "validation".to_string(),
                message.clone(),
                Some(field.clone()),
            ),
            TenantError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error".to_string(),
                msg.clone(),
                None,
            ),
            TenantError::SlugUnavailable { slug, .. } => (
                StatusCode::CONFLICT,
                "slug_unavailable".to_string(),
                format!("Slug '{slug}' is not available"),
                Some("slug".to_string()),
            ),
            TenantError::SlugTaken { slug, .. } => (
                StatusCode::CONFLICT,
                "slug_taken".to_string(),
                format!("Slug '{slug}' was taken, allocate a new one and resubmit"),
                Some("business.slug".to_string()),
            ),
            TenantError::AllocationExhausted { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "allocation_exhausted".to_string(),
                self.to_string(),
                Some("name".to_string()),
            ),
            TenantError::Unavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service_unavailable".to_string(),
                    "A dependency is temporarily unavailable, try again".to_string(),
                    None,
                )
            }
            TenantError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
            TenantError::Remote { code, message } => {
                (StatusCode::BAD_GATEWAY, code.clone(), message.clone(), None)
            }
            TenantError::Notification { body, .. } => (
                StatusCode::BAD_GATEWAY,
                "notification_failed".to_string(),
                body.clone(),
                None,
            ),
            TenantError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, "not_found".to_string(), msg.clone(), None)
            }
            TenantError::TenantNotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found".to_string(),
                format!("Tenant {id} not found"),
                None,
            ),
            TenantError::Conflict(msg) => {
                (StatusCode::CONFLICT, "conflict".to_string(), msg.clone(), None)
            }
            TenantError::RevertFailed { profile_id, .. } => {
                tracing::error!(profile_id = %profile_id, error = %self, "Probe revert failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "revert_failed".to_string(),
                    self.to_string(),
                    None,
                )
            }
            TenantError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error_code,
            message,
            field,
        };

        (status, Json(body)).into_response()
    }
}
