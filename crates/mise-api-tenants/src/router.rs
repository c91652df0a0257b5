//! Router configuration for the onboarding admin API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use mise_clients::{CredentialNotifier, IdentityProvider, RemoteProvisioner};

use crate::handlers::{
    allocate_slug_handler, fail_pending_record_handler, probe_credentials_handler,
    provision_handler, reconciliation_handler, send_credentials_handler,
    slug_availability_handler,
};
use crate::services::{
    AvailabilityService, CredentialService, ProvisioningService, ReconciliationConfig,
    ReconciliationService, SlugService,
};
use crate::stores::OnboardingStores;

/// Remote services the onboarding core calls out to.
#[derive(Clone)]
pub struct RemoteServices {
    pub provisioner: Arc<dyn RemoteProvisioner>,
    pub identities: Arc<dyn IdentityProvider>,
    pub notifier: Arc<dyn CredentialNotifier>,
}

/// Application state shared by the admin handlers and the CLI.
#[derive(Clone)]
pub struct AdminAppState {
    /// Store handles, for direct lookups in handlers.
    pub stores: OnboardingStores,
    pub availability_service: Arc<AvailabilityService>,
    pub slug_service: Arc<SlugService>,
    pub provisioning_service: Arc<ProvisioningService>,
    pub reconciliation_service: Arc<ReconciliationService>,
    pub credential_service: Arc<CredentialService>,
}

impl AdminAppState {
    /// Wire every service from explicit stores and remote clients.
    pub fn new(
        stores: OnboardingStores,
        remotes: RemoteServices,
        reconciliation: ReconciliationConfig,
        login_url: impl Into<String>,
    ) -> Self {
        let availability_service = Arc::new(AvailabilityService::new(
            stores.tenants.clone(),
            stores.ledger.clone(),
        ));
        let slug_service = Arc::new(SlugService::new(availability_service.clone()));
        let provisioning_service = Arc::new(ProvisioningService::new(remotes.provisioner.clone()));
        let reconciliation_service = Arc::new(ReconciliationService::new(
            stores.clone(),
            reconciliation,
        ));
        let credential_service = Arc::new(CredentialService::new(
            remotes.notifier.clone(),
            remotes.identities.clone(),
            stores.clone(),
            login_url,
        ));

        Self {
            stores,
            availability_service,
            slug_service,
            provisioning_service,
            reconciliation_service,
            credential_service,
        }
    }
}

/// Create the onboarding admin router.
///
/// Provides:
/// - POST /slugs/allocate - Derive a free slug from a name
/// - GET /slugs/{slug}/availability - Check one slug
/// - POST /tenants/provision - Submit an onboarding payload
/// - GET /admin/reconciliation - Run the reconciliation sweep
/// - POST /admin/provisioning/{id}/fail - Fail a stuck pending record
/// - POST /admin/tenants/{id}/credentials - Email owner credentials
/// - POST /admin/tenants/{id}/credentials/probe - Reversible update probe
pub fn admin_router(state: AdminAppState) -> Router {
    Router::new()
        .route("/slugs/allocate", post(allocate_slug_handler))
        .route("/slugs/:slug/availability", get(slug_availability_handler))
        .route("/tenants/provision", post(provision_handler))
        .route("/admin/reconciliation", get(reconciliation_handler))
        .route(
            "/admin/provisioning/:id/fail",
            post(fail_pending_record_handler),
        )
        .route(
            "/admin/tenants/:id/credentials",
            post(send_credentials_handler),
        )
        .route(
            "/admin/tenants/:id/credentials/probe",
            post(probe_credentials_handler),
        )
        .with_state(state)
}
