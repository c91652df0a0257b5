//! Provisioning orchestrator.
//!
//! Validates an assembled onboarding payload and hands it to the remote
//! provisioning service in one call. The remote side creates the tenant row
//! and completes the ledger entry; nothing is written locally on the happy
//! path. There are no local retries: a timeout leaves the outcome unknown
//! and is reported as [`TenantError::Unavailable`].

use std::sync::Arc;

use mise_clients::{ClientError, OnboardingPayload, RemoteProvisioner};
use tracing::{info, warn};

use crate::error::{TenantError, TenantResult};
use crate::models::provision::{validate_payload, ProvisionOutcome};

/// Error codes the remote service uses for a slug uniqueness violation.
///
/// Any other conflict (an owner email already registered, for instance) is
/// passed through with its code.
const UNIQUENESS_CODES: [&str; 2] = ["slug_taken", "unique_violation"];

/// Service for submitting onboarding payloads.
#[derive(Clone)]
pub struct ProvisioningService {
    provisioner: Arc<dyn RemoteProvisioner>,
}

impl ProvisioningService {
    /// Create a new provisioning service.
    pub fn new(provisioner: Arc<dyn RemoteProvisioner>) -> Self {
        Self { provisioner }
    }

    /// Validate and submit one onboarding payload.
    ///
    /// A lost slug race comes back as [`TenantError::SlugTaken`]; the caller
    /// re-allocates and resubmits. Every other remote failure keeps its
    /// machine-readable code in [`TenantError::Remote`].
    pub async fn submit(&self, payload: &OnboardingPayload) -> TenantResult<ProvisionOutcome> {
        if let Some(invalid) = validate_payload(payload) {
            return Err(TenantError::ValidationWithField {
                field: invalid.field.to_string(),
                message: invalid.message,
            });
        }

        let slug = payload.business.slug.as_str();
        info!(slug = %slug, plan = ?payload.plan.plan, "Submitting onboarding payload");

        match self.provisioner.create_tenant(payload).await {
            Ok(created) => {
                info!(
                    tenant_id = %created.tenant_id,
                    slug = %created.slug,
                    "Tenant provisioned"
                );
                Ok(ProvisionOutcome {
                    tenant_id: created.tenant_id.into_inner(),
                    slug: created.slug,
                })
            }
            Err(err) => Err(Self::map_remote_error(slug, err)),
        }
    }

    fn map_remote_error(slug: &str, err: ClientError) -> TenantError {
        match err {
            ClientError::Conflict { code, message }
            | ClientError::Remote { code, message, .. }
                if UNIQUENESS_CODES.contains(&code.as_str()) =>
            {
                info!(slug = %slug, code = %code, "Slug lost to a concurrent onboarding");
                TenantError::SlugTaken {
                    slug: slug.to_string(),
                    message,
                }
            }
            other => {
                if other.is_transient() {
                    warn!(slug = %slug, error = %other, "Provisioning outcome unknown");
                }
                TenantError::from(other)
            }
        }
    }
}
