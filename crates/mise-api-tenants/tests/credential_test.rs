//! Integration tests for credential issuing and the reversible probe.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::{profile, record, tenant, Harness, LOGIN_URL};
use mise_api_tenants::models::StepOutcome;
use mise_api_tenants::services::CredentialService;
use mise_api_tenants::stores::{IdentityLinkStore, InMemoryIdentityLinkStore};
use mise_api_tenants::{OnboardingStores, TenantError, TenantResult};
use mise_core::{IdentityId, ProfileId, Severity, TenantId};
use mise_db::models::{Profile, ProvisioningStatus, Tenant};
use uuid::Uuid;

fn credential_service(harness: &Harness, stores: OnboardingStores) -> CredentialService {
    CredentialService::new(
        harness.notifier.clone(),
        harness.identities.clone(),
        stores,
        LOGIN_URL,
    )
}

/// Tenant with a completed ledger entry requested by a linked owner.
async fn seed_owner(harness: &Harness) -> (Tenant, IdentityId, Profile) {
    let identity = IdentityId::new();
    harness.identities.add(identity);

    let t = tenant("la-piazza", "La Piazza", "hello@lapiazza.test", 30);
    harness.stores.tenants.insert(t.clone()).await;

    let mut completed = record(Some(&t), "la-piazza", ProvisioningStatus::Completed, 29);
    completed.requested_by = Some(identity.into_inner());
    harness.stores.ledger.insert(completed).await;

    let owner = profile(
        Some(identity.into_inner()),
        "maria@lapiazza.test",
        "Maria Rossi",
    );
    harness.stores.links.insert(owner.clone()).await;

    (t, identity, owner)
}

/// Link store whose n-th `update_full_name` call fails.
struct FailingUpdates {
    inner: InMemoryIdentityLinkStore,
    fail_on: usize,
    updates: AtomicUsize,
}

impl FailingUpdates {
    fn new(inner: InMemoryIdentityLinkStore, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            updates: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IdentityLinkStore for FailingUpdates {
    async fn find_profile(&self, id: ProfileId) -> TenantResult<Option<Profile>> {
        self.inner.find_profile(id).await
    }

    async fn find_profile_by_email(&self, email: &str) -> TenantResult<Option<Profile>> {
        self.inner.find_profile_by_email(email).await
    }

    async fn find_profile_by_identity(
        &self,
        identity: IdentityId,
    ) -> TenantResult<Option<Profile>> {
        self.inner.find_profile_by_identity(identity).await
    }

    async fn list_unlinked_profiles(&self) -> TenantResult<Vec<Profile>> {
        self.inner.list_unlinked_profiles().await
    }

    async fn update_full_name(
        &self,
        id: ProfileId,
        full_name: &str,
    ) -> TenantResult<Option<Profile>> {
        let call = self.updates.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(TenantError::Unavailable("profiles write timed out".to_string()));
        }
        self.inner.update_full_name(id, full_name).await
    }
}

fn stores_with_links(harness: &Harness, links: Arc<dyn IdentityLinkStore>) -> OnboardingStores {
    OnboardingStores {
        links,
        ..harness.stores.handles()
    }
}

// ============================================================================
// Issuing
// ============================================================================

#[tokio::test]
async fn test_issue_sends_email() {
    let harness = Harness::new();
    let t = tenant("la-piazza", "La Piazza", "hello@lapiazza.test", 5);
    let service = credential_service(&harness, harness.stores.handles());

    let dispatch = service
        .issue(&t, "Maria Rossi", "maria@lapiazza.test", "Tmp0rarySecret")
        .await
        .unwrap();

    assert_eq!(dispatch.recipient, "maria@lapiazza.test");
    assert_eq!(dispatch.message_id, "msg-1");

    let sent = harness.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "maria@lapiazza.test");
    assert_eq!(sent[0].tenant_slug, "la-piazza");
    assert_eq!(sent[0].temporary_secret, "Tmp0rarySecret");
    assert_eq!(sent[0].login_url, LOGIN_URL);
}

#[tokio::test]
async fn test_issue_failure_keeps_remote_body() {
    let harness = Harness::new();
    harness
        .notifier
        .fail_with(422, "Recipient mailbox does not accept mail");
    let t = tenant("la-piazza", "La Piazza", "hello@lapiazza.test", 5);
    let service = credential_service(&harness, harness.stores.handles());

    let err = service
        .issue(&t, "Maria Rossi", "maria@lapiazza.test", "Tmp0rarySecret")
        .await
        .unwrap_err();

    match err {
        TenantError::Notification { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, "Recipient mailbox does not accept mail");
        }
        other => panic!("Expected Notification, got {other:?}"),
    }
    assert!(harness.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_rotate_generates_fresh_secret() {
    let harness = Harness::new();
    let t = tenant("la-piazza", "La Piazza", "hello@lapiazza.test", 5);
    let service = credential_service(&harness, harness.stores.handles());

    service
        .rotate(&t, "Maria Rossi", "maria@lapiazza.test")
        .await
        .unwrap();
    service
        .rotate(&t, "Maria Rossi", "maria@lapiazza.test")
        .await
        .unwrap();

    let sent = harness.notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].temporary_secret.len(), 16);
    assert_ne!(sent[0].temporary_secret, sent[1].temporary_secret);
}

// ============================================================================
// Reversible probe
// ============================================================================

#[tokio::test]
async fn test_probe_restores_original_name() {
    let harness = Harness::new();
    let (t, identity, owner) = seed_owner(&harness).await;
    let service = credential_service(&harness, harness.stores.handles());

    let report = service
        .probe_reversible_update(TenantId::from_uuid(t.id))
        .await
        .unwrap();

    assert!(report.all_passed());
    assert_eq!(report.identity_id, Some(identity.into_inner()));
    assert_eq!(report.profile_id, Some(owner.id));
    let names: Vec<&str> = report.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "resolve_owner",
            "verify_identity",
            "load_profile",
            "write_marker",
            "revert"
        ]
    );

    let stored = harness
        .stores
        .links
        .find_profile(ProfileId::from_uuid(owner.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.full_name, "Maria Rossi");
}

#[tokio::test]
async fn test_probe_falls_back_to_tenant_email_profile() {
    let harness = Harness::new();
    let identity = IdentityId::new();
    harness.identities.add(identity);
    let t = tenant("sushi-bar", "Sushi Bar", "ken@sushibar.test", 10);
    harness.stores.tenants.insert(t.clone()).await;
    let owner = profile(Some(identity.into_inner()), "ken@sushibar.test", "Ken Sato");
    harness.stores.links.insert(owner.clone()).await;
    let service = credential_service(&harness, harness.stores.handles());

    let report = service
        .probe_reversible_update(TenantId::from_uuid(t.id))
        .await
        .unwrap();

    assert!(report.all_passed());
    assert_eq!(report.profile_id, Some(owner.id));
}

#[tokio::test]
async fn test_probe_unlinked_owner_is_not_found() {
    let harness = Harness::new();
    let t = tenant("sushi-bar", "Sushi Bar", "ken@sushibar.test", 10);
    harness.stores.tenants.insert(t.clone()).await;
    harness
        .stores
        .links
        .insert(profile(None, "ken@sushibar.test", "Ken Sato"))
        .await;
    let service = credential_service(&harness, harness.stores.handles());

    let err = service
        .probe_reversible_update(TenantId::from_uuid(t.id))
        .await
        .unwrap_err();
    assert!(matches!(err, TenantError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_probe_unknown_identity_is_not_found() {
    let harness = Harness::new();
    let (t, identity, _) = seed_owner(&harness).await;
    let other = Harness::new();
    // Same data, but the identity provider no longer knows the owner.
    let service = CredentialService::new(
        other.notifier.clone(),
        other.identities.clone(),
        harness.stores.handles(),
        LOGIN_URL,
    );

    let err = service
        .probe_reversible_update(TenantId::from_uuid(t.id))
        .await
        .unwrap_err();
    match err {
        TenantError::NotFound(message) => assert!(message.contains(&identity.to_string())),
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_probe_missing_tenant() {
    let harness = Harness::new();
    let service = credential_service(&harness, harness.stores.handles());

    let err = service
        .probe_reversible_update(TenantId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TenantError::TenantNotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_probe_write_failure_still_reverts() {
    let harness = Harness::new();
    let (t, _, owner) = seed_owner(&harness).await;
    let links = Arc::new(FailingUpdates::new(harness.stores.links.clone(), 1));
    let service = credential_service(&harness, stores_with_links(&harness, links.clone()));

    let report = service
        .probe_reversible_update(TenantId::from_uuid(t.id))
        .await
        .unwrap();

    assert!(!report.all_passed());
    let write = report.steps.iter().find(|s| s.name == "write_marker").unwrap();
    assert_eq!(write.outcome, StepOutcome::Failed);
    assert!(write.detail.as_deref().unwrap().contains("timed out"));
    let revert = report.steps.iter().find(|s| s.name == "revert").unwrap();
    assert_eq!(revert.outcome, StepOutcome::Passed);
    assert_eq!(links.updates.load(Ordering::SeqCst), 2);

    let stored = harness
        .stores
        .links
        .find_profile(ProfileId::from_uuid(owner.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.full_name, "Maria Rossi");
}

#[tokio::test]
async fn test_probe_revert_failure_is_critical() {
    let harness = Harness::new();
    let (t, _, owner) = seed_owner(&harness).await;
    let links = Arc::new(FailingUpdates::new(harness.stores.links.clone(), 2));
    let service = credential_service(&harness, stores_with_links(&harness, links));

    let err = service
        .probe_reversible_update(TenantId::from_uuid(t.id))
        .await
        .unwrap_err();

    assert_eq!(err.severity(), Severity::Critical);
    match err {
        TenantError::RevertFailed {
            profile_id,
            reason,
            earlier,
        } => {
            assert_eq!(profile_id, ProfileId::from_uuid(owner.id));
            assert!(reason.contains("timed out"));
            assert!(earlier.is_none());
        }
        other => panic!("Expected RevertFailed, got {other:?}"),
    }

    // The marker is still in place.
    let stored = harness
        .stores
        .links
        .find_profile(ProfileId::from_uuid(owner.id))
        .await
        .unwrap()
        .unwrap();
    assert!(stored.full_name.starts_with("probe-"));
}

#[tokio::test]
async fn test_probe_ignores_unrelated_profiles() {
    let harness = Harness::new();
    let (t, _, _) = seed_owner(&harness).await;
    let bystander = profile(Some(Uuid::new_v4()), "cook@lapiazza.test", "Line Cook");
    harness.stores.links.insert(bystander.clone()).await;
    let service = credential_service(&harness, harness.stores.handles());

    service
        .probe_reversible_update(TenantId::from_uuid(t.id))
        .await
        .unwrap();

    let stored = harness
        .stores
        .links
        .find_profile(ProfileId::from_uuid(bystander.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.full_name, "Line Cook");
    assert_eq!(stored.updated_at, bystander.updated_at);
}
