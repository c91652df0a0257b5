//! Remote provisioning service client.
//!
//! The remote service owns tenant creation: one `POST /tenants` call creates
//! the registry row and completes the ledger entry together.

use async_trait::async_trait;
use mise_core::{IdentityId, TenantId};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::error::ClientResult;
use crate::http::RemoteHttp;

/// Billing plan selected at onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BillingPlan {
    Starter,
    Growth,
    Enterprise,
}

/// Billing cycle for the selected plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Annual,
}

/// Restaurant details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct BusinessProfile {
    /// Display name (e.g., "La Piazza").
    pub name: String,
    /// Slug obtained from the allocator.
    pub slug: String,
    /// Contact email of the restaurant.
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// IANA timezone name.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// The human who will own the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct OwnerIdentity {
    pub full_name: String,
    pub email: String,
    /// Existing login identity, when the owner already has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub identity_ref: Option<IdentityId>,
}

/// Plan selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PlanSelection {
    pub plan: BillingPlan,
    #[serde(default)]
    pub cycle: BillingCycle,
}

/// Product features switched on for the new tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureFlags {
    pub online_ordering: bool,
    pub reservations: bool,
    pub delivery: bool,
    pub loyalty: bool,
}

/// Complete request body for `POST /tenants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct OnboardingPayload {
    pub business: BusinessProfile,
    pub owner: OwnerIdentity,
    pub plan: PlanSelection,
    #[serde(default)]
    pub features: FeatureFlags,
}

/// Success envelope from the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTenant {
    pub tenant_id: TenantId,
    pub slug: String,
}

/// Creates tenants on the remote provisioning service.
///
/// `create_tenant` is not idempotent. Implementations must not retry it.
#[async_trait]
pub trait RemoteProvisioner: Send + Sync {
    /// Submit one onboarding payload.
    async fn create_tenant(&self, payload: &OnboardingPayload) -> ClientResult<CreatedTenant>;
}

/// HTTP implementation of [`RemoteProvisioner`].
#[derive(Debug, Clone)]
pub struct ProvisioningClient {
    http: RemoteHttp,
}

impl ProvisioningClient {
    /// Create a client over a configured transport.
    #[must_use]
    pub fn new(http: RemoteHttp) -> Self {
        Self { http }
    }
}

#[async_trait]
impl RemoteProvisioner for ProvisioningClient {
    async fn create_tenant(&self, payload: &OnboardingPayload) -> ClientResult<CreatedTenant> {
        let created: CreatedTenant = self.http.post("/tenants", payload).await?;
        info!(
            tenant_id = %created.tenant_id,
            slug = %created.slug,
            "Remote provisioning created tenant"
        );
        Ok(created)
    }
}
