//! Shared fixtures: in-memory stores, row builders and fake remote clients.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mise_api_tenants::services::ReconciliationConfig;
use mise_api_tenants::stores::{
    InMemoryIdentityLinkStore, InMemoryProvisioningLedger, InMemoryTenantRegistry,
};
use mise_api_tenants::{AdminAppState, OnboardingStores, RemoteServices};
use mise_clients::{
    BillingCycle, BillingPlan, BusinessProfile, ClientError, ClientResult, CreatedTenant,
    CredentialNotifier, CredentialsEmail, FeatureFlags, Identity, IdentityProvider,
    NotificationReceipt, OnboardingPayload, OwnerIdentity, PlanSelection, RemoteProvisioner,
    Session,
};
use mise_core::{IdentityId, TenantId};
use mise_db::models::{Profile, ProvisioningRecord, ProvisioningStatus, Tenant, TenantStatus};
use uuid::Uuid;

pub const LOGIN_URL: &str = "https://app.mise.test/login";

// ============================================================================
// Row builders
// ============================================================================

pub fn tenant(slug: &str, name: &str, email: &str, minutes_ago: i64) -> Tenant {
    Tenant {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        status: TenantStatus::Active,
        created_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

pub fn record(
    tenant: Option<&Tenant>,
    candidate_slug: &str,
    status: ProvisioningStatus,
    minutes_ago: i64,
) -> ProvisioningRecord {
    let created_at = Utc::now() - Duration::minutes(minutes_ago);
    ProvisioningRecord {
        id: Uuid::new_v4(),
        tenant_id: tenant.map(|t| t.id),
        requested_by: None,
        candidate_slug: candidate_slug.to_string(),
        status,
        error_message: None,
        created_at,
        updated_at: created_at,
    }
}

pub fn profile(identity_ref: Option<Uuid>, email: &str, full_name: &str) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        identity_ref,
        email: email.to_string(),
        full_name: full_name.to_string(),
        role: "owner".to_string(),
        updated_at: Utc::now(),
    }
}

pub fn payload(slug: &str) -> OnboardingPayload {
    OnboardingPayload {
        business: BusinessProfile {
            name: "La Piazza".to_string(),
            slug: slug.to_string(),
            contact_email: "hello@lapiazza.test".to_string(),
            phone: None,
            address: Some("Via Roma 1, Roma".to_string()),
            timezone: "Europe/Rome".to_string(),
            cuisine: Some("italian".to_string()),
        },
        owner: OwnerIdentity {
            full_name: "Maria Rossi".to_string(),
            email: "maria@lapiazza.test".to_string(),
            identity_ref: None,
        },
        plan: PlanSelection {
            plan: BillingPlan::Growth,
            cycle: BillingCycle::Monthly,
        },
        features: FeatureFlags {
            online_ordering: true,
            ..FeatureFlags::default()
        },
    }
}

// ============================================================================
// In-memory stores
// ============================================================================

#[derive(Clone, Default)]
pub struct MemoryStores {
    pub tenants: InMemoryTenantRegistry,
    pub ledger: InMemoryProvisioningLedger,
    pub links: InMemoryIdentityLinkStore,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handles(&self) -> OnboardingStores {
        OnboardingStores {
            tenants: Arc::new(self.tenants.clone()),
            ledger: Arc::new(self.ledger.clone()),
            links: Arc::new(self.links.clone()),
        }
    }
}

// ============================================================================
// Fake remote clients
// ============================================================================

/// Provisioner that replays queued results and counts calls.
#[derive(Default)]
pub struct FakeProvisioner {
    responses: Mutex<VecDeque<ClientResult<CreatedTenant>>>,
    calls: AtomicUsize,
}

impl FakeProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: ClientResult<CreatedTenant>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn push_created(&self, slug: &str) -> TenantId {
        let tenant_id = TenantId::new();
        self.push(Ok(CreatedTenant {
            tenant_id,
            slug: slug.to_string(),
        }));
        tenant_id
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteProvisioner for FakeProvisioner {
    async fn create_tenant(&self, _payload: &OnboardingPayload) -> ClientResult<CreatedTenant> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Transport("no scripted response".to_string())))
    }
}

/// Identity provider that knows a fixed set of identities.
#[derive(Default)]
pub struct FakeIdentityProvider {
    known: Mutex<HashSet<IdentityId>>,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, id: IdentityId) {
        self.known.lock().unwrap().insert(id);
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn get_identity(&self, id: IdentityId) -> ClientResult<Option<Identity>> {
        let known = self.known.lock().unwrap().contains(&id);
        Ok(known.then(|| Identity {
            id,
            email: "owner@example.test".to_string(),
            email_confirmed: true,
            created_at: None,
        }))
    }

    async fn find_identity_by_email(&self, _email: &str) -> ClientResult<Option<Identity>> {
        Ok(None)
    }

    async fn refresh_session(&self) -> ClientResult<Session> {
        Ok(Session {
            access_token: "fake".to_string(),
            expires_at: None,
        })
    }
}

/// Notifier that records sent emails, or fails with a fixed response.
#[derive(Default)]
pub struct FakeNotifier {
    failure: Mutex<Option<(u16, String)>>,
    sent: Mutex<Vec<CredentialsEmail>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, status: u16, body: &str) {
        *self.failure.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn sent(&self) -> Vec<CredentialsEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialNotifier for FakeNotifier {
    async fn send_credentials(&self, email: &CredentialsEmail) -> ClientResult<NotificationReceipt> {
        if let Some((status, body)) = self.failure.lock().unwrap().clone() {
            return Err(ClientError::Remote {
                status,
                code: format!("http_{status}"),
                message: body,
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(NotificationReceipt {
            message_id: format!("msg-{}", sent.len()),
        })
    }
}

/// Everything a service or router test needs.
pub struct Harness {
    pub stores: MemoryStores,
    pub provisioner: Arc<FakeProvisioner>,
    pub identities: Arc<FakeIdentityProvider>,
    pub notifier: Arc<FakeNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            stores: MemoryStores::new(),
            provisioner: Arc::new(FakeProvisioner::new()),
            identities: Arc::new(FakeIdentityProvider::new()),
            notifier: Arc::new(FakeNotifier::new()),
        }
    }

    pub fn remotes(&self) -> RemoteServices {
        RemoteServices {
            provisioner: self.provisioner.clone(),
            identities: self.identities.clone(),
            notifier: self.notifier.clone(),
        }
    }

    pub fn state(&self) -> AdminAppState {
        AdminAppState::new(
            self.stores.handles(),
            self.remotes(),
            ReconciliationConfig::default(),
            LOGIN_URL,
        )
    }
}
