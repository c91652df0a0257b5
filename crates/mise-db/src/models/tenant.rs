//! Tenant model for mise-db.
//!
//! A tenant is one onboarded restaurant account. Rows are written by the
//! remote provisioning service; this crate only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Type};
use uuid::Uuid;

use crate::DbError;

// ============================================================================
// TenantStatus Enum
// ============================================================================

/// Lifecycle status of a tenant.
///
/// Tenants are never deleted; deactivation is a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Type, Serialize, Deserialize)]
#[sqlx(type_name = "tenant_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    /// Serving traffic.
    #[default]
    Active,
    /// Access blocked by an administrator.
    Suspended,
    /// Created but not yet activated.
    Pending,
    /// Closed by the owner or the platform.
    Cancelled,
}

impl std::fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TenantStatus::Active => write!(f, "active"),
            TenantStatus::Suspended => write!(f, "suspended"),
            TenantStatus::Pending => write!(f, "pending"),
            TenantStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ============================================================================
// Tenant Struct
// ============================================================================

/// A restaurant tenant in the registry.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique identifier for the tenant.
    pub id: Uuid,

    /// URL-safe slug (e.g., "la-piazza"). Unique across all tenants.
    pub slug: String,

    /// Display name (e.g., "La Piazza").
    pub name: String,

    /// Contact email of the restaurant.
    pub email: String,

    /// Lifecycle status.
    pub status: TenantStatus,

    /// Timestamp when the tenant was created.
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Returns `true` if the tenant is serving traffic.
    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }

    /// Finds a tenant by its ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, slug, name, email, status, created_at
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Check if a slug already exists.
    pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, DbError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(SELECT 1 FROM tenants WHERE slug = $1)
            "#,
        )
        .bind(slug)
        .fetch_one(pool)
        .await
        .map_err(DbError::QueryFailed)?;

        Ok(result.0)
    }

    /// Finds all tenants whose contact email matches exactly.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, slug, name, email, status, created_at
            FROM tenants
            WHERE email = $1
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(email)
        .fetch_all(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Lists the most recently created tenants.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, slug, name, email, status, created_at
            FROM tenants
            ORDER BY created_at DESC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Lists all tenants.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, slug, name, email, status, created_at
            FROM tenants
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(DbError::QueryFailed)
    }
}
