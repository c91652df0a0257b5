//! In-memory stores for tests and dry runs.
//!
//! Each store can be switched to "unavailable" to simulate an unreachable
//! database; every call then fails with [`TenantError::Unavailable`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mise_core::{IdentityId, ProfileId, ProvisioningRecordId, TenantId};
use mise_db::models::{Profile, ProvisioningRecord, ProvisioningStatus, Tenant};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{IdentityLinkStore, ProvisioningLedger, TenantRegistry};
use crate::error::{TenantError, TenantResult};

#[derive(Debug, Clone, Default)]
struct Outage(Arc<AtomicBool>);

impl Outage {
    fn set(&self, down: bool) {
        self.0.store(down, Ordering::SeqCst);
    }

    fn check(&self, store: &str) -> TenantResult<()> {
        if self.0.load(Ordering::SeqCst) {
            Err(TenantError::Unavailable(format!("{store} is unreachable")))
        } else {
            Ok(())
        }
    }
}

/// In-memory tenant registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTenantRegistry {
    tenants: Arc<RwLock<HashMap<Uuid, Tenant>>>,
    outage: Outage,
}

impl InMemoryTenantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tenant.
    pub async fn insert(&self, tenant: Tenant) {
        self.tenants.write().await.insert(tenant.id, tenant);
    }

    /// Simulate the registry going down (or coming back).
    pub fn set_unavailable(&self, down: bool) {
        self.outage.set(down);
    }

    async fn sorted(&self) -> Vec<Tenant> {
        let mut tenants: Vec<Tenant> = self.tenants.read().await.values().cloned().collect();
        tenants.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        tenants
    }
}

#[async_trait]
impl TenantRegistry for InMemoryTenantRegistry {
    async fn slug_exists(&self, slug: &str) -> TenantResult<bool> {
        self.outage.check("tenant registry")?;
        Ok(self.tenants.read().await.values().any(|t| t.slug == slug))
    }

    async fn find_tenant(&self, id: TenantId) -> TenantResult<Option<Tenant>> {
        self.outage.check("tenant registry")?;
        Ok(self.tenants.read().await.get(id.as_uuid()).cloned())
    }

    async fn find_tenants_by_email(&self, email: &str) -> TenantResult<Vec<Tenant>> {
        self.outage.check("tenant registry")?;
        Ok(self
            .sorted()
            .await
            .into_iter()
            .filter(|t| t.email == email)
            .collect())
    }

    async fn list_recent_tenants(&self, limit: usize) -> TenantResult<Vec<Tenant>> {
        self.outage.check("tenant registry")?;
        Ok(self.sorted().await.into_iter().take(limit).collect())
    }

    async fn list_tenants(&self) -> TenantResult<Vec<Tenant>> {
        self.outage.check("tenant registry")?;
        Ok(self.sorted().await)
    }
}

/// In-memory provisioning ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvisioningLedger {
    records: Arc<RwLock<HashMap<Uuid, ProvisioningRecord>>>,
    outage: Outage,
}

impl InMemoryProvisioningLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a ledger entry.
    pub async fn insert(&self, record: ProvisioningRecord) {
        self.records.write().await.insert(record.id, record);
    }

    /// Simulate the ledger going down (or coming back).
    pub fn set_unavailable(&self, down: bool) {
        self.outage.set(down);
    }

    async fn sorted(&self) -> Vec<ProvisioningRecord> {
        let mut records: Vec<ProvisioningRecord> =
            self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        records
    }
}

#[async_trait]
impl ProvisioningLedger for InMemoryProvisioningLedger {
    async fn candidate_slug_exists(&self, slug: &str) -> TenantResult<bool> {
        self.outage.check("provisioning ledger")?;
        Ok(self
            .records
            .read()
            .await
            .values()
            .any(|r| r.candidate_slug == slug))
    }

    async fn find_record(
        &self,
        id: ProvisioningRecordId,
    ) -> TenantResult<Option<ProvisioningRecord>> {
        self.outage.check("provisioning ledger")?;
        Ok(self.records.read().await.get(id.as_uuid()).cloned())
    }

    async fn find_completed_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> TenantResult<Option<ProvisioningRecord>> {
        self.outage.check("provisioning ledger")?;
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|r| r.tenant_id == Some(tenant_id.into_inner()) && r.is_completed())
            .cloned())
    }

    async fn list_recent_records(&self, limit: usize) -> TenantResult<Vec<ProvisioningRecord>> {
        self.outage.check("provisioning ledger")?;
        Ok(self.sorted().await.into_iter().take(limit).collect())
    }

    async fn list_records(&self) -> TenantResult<Vec<ProvisioningRecord>> {
        self.outage.check("provisioning ledger")?;
        Ok(self.sorted().await)
    }

    async fn mark_failed(
        &self,
        id: ProvisioningRecordId,
        reason: &str,
    ) -> TenantResult<Option<ProvisioningRecord>> {
        self.outage.check("provisioning ledger")?;
        let mut records = self.records.write().await;
        match records.get_mut(id.as_uuid()) {
            Some(record) if record.status == ProvisioningStatus::Pending => {
                record.status = ProvisioningStatus::Failed;
                record.error_message = Some(reason.to_string());
                record.updated_at = Utc::now();
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }
}

/// In-memory identity-link store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityLinkStore {
    profiles: Arc<RwLock<HashMap<Uuid, Profile>>>,
    outage: Outage,
}

impl InMemoryIdentityLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile.
    pub async fn insert(&self, profile: Profile) {
        self.profiles.write().await.insert(profile.id, profile);
    }

    /// Simulate the store going down (or coming back).
    pub fn set_unavailable(&self, down: bool) {
        self.outage.set(down);
    }
}

#[async_trait]
impl IdentityLinkStore for InMemoryIdentityLinkStore {
    async fn find_profile(&self, id: ProfileId) -> TenantResult<Option<Profile>> {
        self.outage.check("identity links")?;
        Ok(self.profiles.read().await.get(id.as_uuid()).cloned())
    }

    async fn find_profile_by_email(&self, email: &str) -> TenantResult<Option<Profile>> {
        self.outage.check("identity links")?;
        let profiles = self.profiles.read().await;
        let mut matches: Vec<&Profile> = profiles.values().filter(|p| p.email == email).collect();
        matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(matches.first().map(|p| (*p).clone()))
    }

    async fn find_profile_by_identity(
        &self,
        identity: IdentityId,
    ) -> TenantResult<Option<Profile>> {
        self.outage.check("identity links")?;
        let profiles = self.profiles.read().await;
        let mut matches: Vec<&Profile> = profiles
            .values()
            .filter(|p| p.identity_ref == Some(identity.into_inner()))
            .collect();
        matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(matches.first().map(|p| (*p).clone()))
    }

    async fn list_unlinked_profiles(&self) -> TenantResult<Vec<Profile>> {
        self.outage.check("identity links")?;
        let mut unlinked: Vec<Profile> = self
            .profiles
            .read()
            .await
            .values()
            .filter(|p| p.is_unlinked())
            .cloned()
            .collect();
        unlinked.sort_by(|a, b| a.email.cmp(&b.email).then(a.id.cmp(&b.id)));
        Ok(unlinked)
    }

    async fn update_full_name(
        &self,
        id: ProfileId,
        full_name: &str,
    ) -> TenantResult<Option<Profile>> {
        self.outage.check("identity links")?;
        let mut profiles = self.profiles.write().await;
        Ok(profiles.get_mut(id.as_uuid()).map(|profile| {
            profile.full_name = full_name.to_string();
            profile.updated_at = Utc::now();
            profile.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use mise_db::models::TenantStatus;

    fn tenant(slug: &str, age_minutes: i64) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            name: slug.to_string(),
            email: format!("{slug}@example.test"),
            status: TenantStatus::Active,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    fn pending(slug: &str) -> ProvisioningRecord {
        ProvisioningRecord {
            id: Uuid::new_v4(),
            tenant_id: None,
            requested_by: None,
            candidate_slug: slug.to_string(),
            status: ProvisioningStatus::Pending,
            error_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_recent_tenants_newest_first() {
        let registry = InMemoryTenantRegistry::new();
        registry.insert(tenant("oldest", 30)).await;
        registry.insert(tenant("newest", 1)).await;
        registry.insert(tenant("middle", 10)).await;

        let recent = registry.list_recent_tenants(2).await.unwrap();
        let slugs: Vec<&str> = recent.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newest", "middle"]);
    }

    #[tokio::test]
    async fn test_outage_fails_every_call() {
        let registry = InMemoryTenantRegistry::new();
        registry.set_unavailable(true);
        assert!(matches!(
            registry.slug_exists("la-piazza").await,
            Err(TenantError::Unavailable(_))
        ));
        registry.set_unavailable(false);
        assert!(!registry.slug_exists("la-piazza").await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_failed_only_from_pending() {
        let ledger = InMemoryProvisioningLedger::new();
        let record = pending("la-piazza");
        let id = ProvisioningRecordId::from_uuid(record.id);
        ledger.insert(record).await;

        let failed = ledger.mark_failed(id, "stuck").await.unwrap().unwrap();
        assert_eq!(failed.status, ProvisioningStatus::Failed);
        assert_eq!(failed.error_message.as_deref(), Some("stuck"));

        // Second transition is refused.
        assert!(ledger.mark_failed(id, "again").await.unwrap().is_none());
    }
}
