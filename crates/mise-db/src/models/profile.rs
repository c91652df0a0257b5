//! Identity-link model (`profiles` table).
//!
//! Maps a login identity to its display email. An owner profile without an
//! `identity_ref` is a data-integrity defect; it is reported, never repaired
//! here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::DbError;

/// A profile row linking a login identity to an email.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Profile {
    /// Profile identifier.
    pub id: Uuid,

    /// Identity in the authentication service. NULL means the link is broken.
    pub identity_ref: Option<Uuid>,

    /// Display email.
    pub email: String,

    /// Display name.
    pub full_name: String,

    /// Role of the profile within its tenant (e.g. "owner").
    pub role: String,

    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Returns `true` if the profile has no backing identity.
    pub fn is_unlinked(&self) -> bool {
        self.identity_ref.is_none()
    }

    /// Finds a profile by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, identity_ref, email, full_name, role, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Finds the first profile with the given email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, identity_ref, email, full_name, role, updated_at
            FROM profiles
            WHERE email = $1
            ORDER BY updated_at DESC, id ASC
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Finds the profile linked to an identity.
    pub async fn find_by_identity_ref(
        pool: &PgPool,
        identity_ref: Uuid,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, identity_ref, email, full_name, role, updated_at
            FROM profiles
            WHERE identity_ref = $1
            ORDER BY updated_at DESC, id ASC
            LIMIT 1
            "#,
        )
        .bind(identity_ref)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Lists profiles whose identity reference is NULL.
    pub async fn list_unlinked(pool: &PgPool) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, identity_ref, email, full_name, role, updated_at
            FROM profiles
            WHERE identity_ref IS NULL
            ORDER BY email ASC, id ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Overwrite the display name of one profile.
    ///
    /// Returns `None` when the row does not exist.
    pub async fn update_full_name(
        pool: &PgPool,
        id: Uuid,
        full_name: &str,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE profiles
            SET full_name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, identity_ref, email, full_name, role, updated_at
            "#,
        )
        .bind(id)
        .bind(full_name)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }
}
