//! Slug availability checks against the registry and the ledger.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::stores::{ProvisioningLedger, TenantRegistry};

/// Which of the two existence checks a result refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlugSource {
    TenantRegistry,
    ProvisioningLedger,
}

impl SlugSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlugSource::TenantRegistry => "tenant_registry",
            SlugSource::ProvisioningLedger => "provisioning_ledger",
        }
    }
}

/// Outcome of checking one candidate slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlugAvailability {
    /// Neither the registry nor the ledger knows the slug.
    Available,
    /// A tenant already uses the slug.
    ClaimedByTenant,
    /// A provisioning attempt (of any status) claimed the slug.
    ClaimedByProvisioning,
    /// A store lookup failed; treated as unavailable.
    CheckFailed { source: SlugSource },
}

impl SlugAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, SlugAvailability::Available)
    }
}

impl fmt::Display for SlugAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlugAvailability::Available => write!(f, "available"),
            SlugAvailability::ClaimedByTenant => write!(f, "claimed by an existing tenant"),
            SlugAvailability::ClaimedByProvisioning => {
                write!(f, "claimed by a provisioning attempt")
            }
            SlugAvailability::CheckFailed { source } => {
                write!(f, "{} check failed", source.as_str())
            }
        }
    }
}

/// Checks a candidate slug against both sources of truth.
///
/// The check is read-only and fails closed: a store error yields
/// [`SlugAvailability::CheckFailed`], never `Available`.
#[derive(Clone)]
pub struct AvailabilityService {
    tenants: Arc<dyn TenantRegistry>,
    ledger: Arc<dyn ProvisioningLedger>,
}

impl AvailabilityService {
    pub fn new(tenants: Arc<dyn TenantRegistry>, ledger: Arc<dyn ProvisioningLedger>) -> Self {
        Self { tenants, ledger }
    }

    /// Check one already-normalized candidate.
    pub async fn check(&self, candidate: &str) -> SlugAvailability {
        match self.tenants.slug_exists(candidate).await {
            Ok(true) => return SlugAvailability::ClaimedByTenant,
            Ok(false) => {}
            Err(e) => {
                warn!(
                    check = SlugSource::TenantRegistry.as_str(),
                    candidate = %candidate,
                    error = %e,
                    "Slug availability check failed"
                );
                return SlugAvailability::CheckFailed {
                    source: SlugSource::TenantRegistry,
                };
            }
        }

        match self.ledger.candidate_slug_exists(candidate).await {
            Ok(true) => SlugAvailability::ClaimedByProvisioning,
            Ok(false) => {
                debug!(candidate = %candidate, "Slug available");
                SlugAvailability::Available
            }
            Err(e) => {
                warn!(
                    check = SlugSource::ProvisioningLedger.as_str(),
                    candidate = %candidate,
                    error = %e,
                    "Slug availability check failed"
                );
                SlugAvailability::CheckFailed {
                    source: SlugSource::ProvisioningLedger,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{InMemoryProvisioningLedger, InMemoryTenantRegistry};

    fn service() -> (
        AvailabilityService,
        InMemoryTenantRegistry,
        InMemoryProvisioningLedger,
    ) {
        let tenants = InMemoryTenantRegistry::new();
        let ledger = InMemoryProvisioningLedger::new();
        let service = AvailabilityService::new(Arc::new(tenants.clone()), Arc::new(ledger.clone()));
        (service, tenants, ledger)
    }

    #[tokio::test]
    async fn test_empty_stores_available() {
        let (service, _, _) = service();
        assert_eq!(
            service.check("la-piazza").await,
            SlugAvailability::Available
        );
    }

    #[tokio::test]
    async fn test_registry_failure_fails_closed() {
        let (service, tenants, _) = service();
        tenants.set_unavailable(true);
        let result = service.check("la-piazza").await;
        assert_eq!(
            result,
            SlugAvailability::CheckFailed {
                source: SlugSource::TenantRegistry
            }
        );
        assert!(!result.is_available());
    }

    #[tokio::test]
    async fn test_ledger_failure_fails_closed() {
        let (service, _, ledger) = service();
        ledger.set_unavailable(true);
        assert_eq!(
            service.check("la-piazza").await,
            SlugAvailability::CheckFailed {
                source: SlugSource::ProvisioningLedger
            }
        );
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(SlugAvailability::CheckFailed {
            source: SlugSource::ProvisioningLedger,
        })
        .unwrap();
        assert_eq!(json["status"], "check_failed");
        assert_eq!(json["source"], "provisioning_ledger");
    }
}
