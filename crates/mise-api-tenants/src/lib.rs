//! Tenant onboarding core for mise.
//!
//! Allocates unique slugs, submits onboarding payloads to the remote
//! provisioning service, reconciles the tenant registry against the
//! provisioning ledger and issues owner credentials.
//!
//! ## Services
//!
//! - [`services::SlugService`]: normalization and sequential suffix allocation
//! - [`services::AvailabilityService`]: fail-closed slug checks
//! - [`services::ProvisioningService`]: payload validation and submission
//! - [`services::ReconciliationService`]: read-only consistency report
//! - [`services::CredentialService`]: credentials email and reversible probe
//!
//! Every service receives its stores and clients explicitly; see
//! [`router::AdminAppState::new`].

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod stores;

pub use error::{ErrorResponse, TenantError, TenantResult};
pub use router::{admin_router, AdminAppState, RemoteServices};
pub use stores::OnboardingStores;
