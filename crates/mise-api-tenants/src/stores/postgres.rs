//! PostgreSQL stores over the `mise-db` models.

use async_trait::async_trait;
use mise_core::{IdentityId, ProfileId, ProvisioningRecordId, TenantId};
use mise_db::models::{Profile, ProvisioningRecord, Tenant};
use mise_db::DbPool;

use super::{IdentityLinkStore, ProvisioningLedger, TenantRegistry};
use crate::error::TenantResult;

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Tenant registry backed by the `tenants` table.
#[derive(Debug, Clone)]
pub struct PgTenantRegistry {
    pool: DbPool,
}

impl PgTenantRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRegistry for PgTenantRegistry {
    async fn slug_exists(&self, slug: &str) -> TenantResult<bool> {
        Ok(Tenant::slug_exists(self.pool.inner(), slug).await?)
    }

    async fn find_tenant(&self, id: TenantId) -> TenantResult<Option<Tenant>> {
        Ok(Tenant::find_by_id(self.pool.inner(), id.into_inner()).await?)
    }

    async fn find_tenants_by_email(&self, email: &str) -> TenantResult<Vec<Tenant>> {
        Ok(Tenant::find_by_email(self.pool.inner(), email).await?)
    }

    async fn list_recent_tenants(&self, limit: usize) -> TenantResult<Vec<Tenant>> {
        Ok(Tenant::list_recent(self.pool.inner(), sql_limit(limit)).await?)
    }

    async fn list_tenants(&self) -> TenantResult<Vec<Tenant>> {
        Ok(Tenant::list_all(self.pool.inner()).await?)
    }
}

/// Provisioning ledger backed by the `auto_provisioning` table.
#[derive(Debug, Clone)]
pub struct PgProvisioningLedger {
    pool: DbPool,
}

impl PgProvisioningLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProvisioningLedger for PgProvisioningLedger {
    async fn candidate_slug_exists(&self, slug: &str) -> TenantResult<bool> {
        Ok(ProvisioningRecord::candidate_slug_exists(self.pool.inner(), slug).await?)
    }

    async fn find_record(
        &self,
        id: ProvisioningRecordId,
    ) -> TenantResult<Option<ProvisioningRecord>> {
        Ok(ProvisioningRecord::find_by_id(self.pool.inner(), id.into_inner()).await?)
    }

    async fn find_completed_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> TenantResult<Option<ProvisioningRecord>> {
        Ok(
            ProvisioningRecord::find_completed_for_tenant(self.pool.inner(), tenant_id.into_inner())
                .await?,
        )
    }

    async fn list_recent_records(&self, limit: usize) -> TenantResult<Vec<ProvisioningRecord>> {
        Ok(ProvisioningRecord::list_recent(self.pool.inner(), sql_limit(limit)).await?)
    }

    async fn list_records(&self) -> TenantResult<Vec<ProvisioningRecord>> {
        Ok(ProvisioningRecord::list_all(self.pool.inner()).await?)
    }

    async fn mark_failed(
        &self,
        id: ProvisioningRecordId,
        reason: &str,
    ) -> TenantResult<Option<ProvisioningRecord>> {
        Ok(ProvisioningRecord::mark_failed(self.pool.inner(), id.into_inner(), reason).await?)
    }
}

/// Identity links backed by the `profiles` table.
#[derive(Debug, Clone)]
pub struct PgIdentityLinkStore {
    pool: DbPool,
}

impl PgIdentityLinkStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityLinkStore for PgIdentityLinkStore {
    async fn find_profile(&self, id: ProfileId) -> TenantResult<Option<Profile>> {
        Ok(Profile::find_by_id(self.pool.inner(), id.into_inner()).await?)
    }

    async fn find_profile_by_email(&self, email: &str) -> TenantResult<Option<Profile>> {
        Ok(Profile::find_by_email(self.pool.inner(), email).await?)
    }

    async fn find_profile_by_identity(
        &self,
        identity: IdentityId,
    ) -> TenantResult<Option<Profile>> {
        Ok(Profile::find_by_identity_ref(self.pool.inner(), identity.into_inner()).await?)
    }

    async fn list_unlinked_profiles(&self) -> TenantResult<Vec<Profile>> {
        Ok(Profile::list_unlinked(self.pool.inner()).await?)
    }

    async fn update_full_name(
        &self,
        id: ProfileId,
        full_name: &str,
    ) -> TenantResult<Option<Profile>> {
        Ok(Profile::update_full_name(self.pool.inner(), id.into_inner(), full_name).await?)
    }
}
