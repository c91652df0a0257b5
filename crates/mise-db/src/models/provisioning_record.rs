//! Provisioning ledger model (`auto_provisioning` table).
//!
//! One row per onboarding attempt. Rows are never hard-deleted; they form the
//! audit trail that the reconciliation sweep compares against the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Type};
use uuid::Uuid;

use crate::DbError;

/// Status of an onboarding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(type_name = "provisioning_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProvisioningStatus {
    /// Submitted; the remote service has not reported an outcome.
    Pending,
    /// Tenant row created and linked.
    Completed,
    /// The attempt failed and will not complete.
    Failed,
}

impl std::fmt::Display for ProvisioningStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProvisioningStatus::Pending => write!(f, "pending"),
            ProvisioningStatus::Completed => write!(f, "completed"),
            ProvisioningStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A ledger entry for one onboarding attempt.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ProvisioningRecord {
    /// Ledger entry identifier.
    pub id: Uuid,

    /// Tenant this attempt produced. NULL until the remote service resolves it.
    pub tenant_id: Option<Uuid>,

    /// Identity that requested the onboarding.
    pub requested_by: Option<Uuid>,

    /// Slug claimed by this attempt.
    pub candidate_slug: String,

    /// Current status.
    pub status: ProvisioningStatus,

    /// Failure detail recorded by the remote service or an operator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// When the attempt started.
    pub created_at: DateTime<Utc>,

    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

impl ProvisioningRecord {
    /// Returns `true` if this record completed.
    pub fn is_completed(&self) -> bool {
        self.status == ProvisioningStatus::Completed
    }

    /// Check if any ledger entry claims the slug, whatever its status.
    pub async fn candidate_slug_exists(pool: &PgPool, slug: &str) -> Result<bool, DbError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(SELECT 1 FROM auto_provisioning WHERE candidate_slug = $1)
            "#,
        )
        .bind(slug)
        .fetch_one(pool)
        .await
        .map_err(DbError::QueryFailed)?;

        Ok(result.0)
    }

    /// Finds a ledger entry by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, tenant_id, requested_by, candidate_slug, status, error_message, created_at, updated_at
            FROM auto_provisioning
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Finds the completed entry for a tenant, if any.
    pub async fn find_completed_for_tenant(
        pool: &PgPool,
        tenant_id: Uuid,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, tenant_id, requested_by, candidate_slug, status, error_message, created_at, updated_at
            FROM auto_provisioning
            WHERE tenant_id = $1 AND status = 'completed'
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Lists the most recent ledger entries.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, tenant_id, requested_by, candidate_slug, status, error_message, created_at, updated_at
            FROM auto_provisioning
            ORDER BY created_at DESC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Lists every ledger entry.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, tenant_id, requested_by, candidate_slug, status, error_message, created_at, updated_at
            FROM auto_provisioning
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Transition a pending entry to `failed`.
    ///
    /// Returns `None` when the row does not exist or is no longer pending.
    pub async fn mark_failed(
        pool: &PgPool,
        id: Uuid,
        reason: &str,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE auto_provisioning
            SET status = 'failed', error_message = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING id, tenant_id, requested_by, candidate_slug, status, error_message, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(reason)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }
}
