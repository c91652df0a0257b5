//! Services for tenant onboarding.

pub mod availability_service;
pub mod credential_service;
pub mod provisioning_service;
pub mod reconciliation_service;
pub mod slug_service;

pub use availability_service::{AvailabilityService, SlugAvailability, SlugSource};
pub use credential_service::CredentialService;
pub use provisioning_service::ProvisioningService;
pub use reconciliation_service::{ReconciliationConfig, ReconciliationService};
pub use slug_service::SlugService;
