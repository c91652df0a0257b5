//! Store seams for the tenant registry, the provisioning ledger and the
//! identity-link table.
//!
//! Services hold these as `Arc<dyn ...>` so they run unchanged against
//! PostgreSQL ([`postgres`]) or the in-memory stores ([`memory`]) used by
//! tests and dry runs. Listings are ordered newest first, ties broken by id.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use mise_core::{IdentityId, ProfileId, ProvisioningRecordId, TenantId};
use mise_db::models::{Profile, ProvisioningRecord, Tenant};

use crate::error::TenantResult;

pub use memory::{InMemoryIdentityLinkStore, InMemoryProvisioningLedger, InMemoryTenantRegistry};
pub use postgres::{PgIdentityLinkStore, PgProvisioningLedger, PgTenantRegistry};

/// Read access to the tenant registry.
#[async_trait]
pub trait TenantRegistry: Send + Sync {
    /// Check if any tenant owns the slug.
    async fn slug_exists(&self, slug: &str) -> TenantResult<bool>;

    /// Get a tenant by ID.
    async fn find_tenant(&self, id: TenantId) -> TenantResult<Option<Tenant>>;

    /// Tenants whose contact email matches exactly.
    async fn find_tenants_by_email(&self, email: &str) -> TenantResult<Vec<Tenant>>;

    /// The `limit` most recently created tenants.
    async fn list_recent_tenants(&self, limit: usize) -> TenantResult<Vec<Tenant>>;

    /// Every tenant.
    async fn list_tenants(&self) -> TenantResult<Vec<Tenant>>;
}

/// Access to the provisioning ledger.
#[async_trait]
pub trait ProvisioningLedger: Send + Sync {
    /// Check if any ledger entry claims the slug, whatever its status.
    async fn candidate_slug_exists(&self, slug: &str) -> TenantResult<bool>;

    /// Get a ledger entry by ID.
    async fn find_record(&self, id: ProvisioningRecordId)
        -> TenantResult<Option<ProvisioningRecord>>;

    /// The completed entry for a tenant, if any.
    async fn find_completed_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> TenantResult<Option<ProvisioningRecord>>;

    /// The `limit` most recent entries.
    async fn list_recent_records(&self, limit: usize) -> TenantResult<Vec<ProvisioningRecord>>;

    /// Every entry.
    async fn list_records(&self) -> TenantResult<Vec<ProvisioningRecord>>;

    /// Move a `pending` entry to `failed`.
    ///
    /// Returns `None` when the entry is missing or no longer pending.
    async fn mark_failed(
        &self,
        id: ProvisioningRecordId,
        reason: &str,
    ) -> TenantResult<Option<ProvisioningRecord>>;
}

/// Access to identity-link profiles.
#[async_trait]
pub trait IdentityLinkStore: Send + Sync {
    /// Get a profile by ID.
    async fn find_profile(&self, id: ProfileId) -> TenantResult<Option<Profile>>;

    /// Get a profile by email.
    async fn find_profile_by_email(&self, email: &str) -> TenantResult<Option<Profile>>;

    /// Get the profile linked to an identity.
    async fn find_profile_by_identity(&self, identity: IdentityId)
        -> TenantResult<Option<Profile>>;

    /// Profiles with no identity reference, ordered by email then id.
    async fn list_unlinked_profiles(&self) -> TenantResult<Vec<Profile>>;

    /// Overwrite the display name of one profile.
    async fn update_full_name(
        &self,
        id: ProfileId,
        full_name: &str,
    ) -> TenantResult<Option<Profile>>;
}

/// The three store handles the onboarding services share.
#[derive(Clone)]
pub struct OnboardingStores {
    pub tenants: Arc<dyn TenantRegistry>,
    pub ledger: Arc<dyn ProvisioningLedger>,
    pub links: Arc<dyn IdentityLinkStore>,
}

impl OnboardingStores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: &mise_db::DbPool) -> Self {
        Self {
            tenants: Arc::new(PgTenantRegistry::new(pool.clone())),
            ledger: Arc::new(PgProvisioningLedger::new(pool.clone())),
            links: Arc::new(PgIdentityLinkStore::new(pool.clone())),
        }
    }
}
