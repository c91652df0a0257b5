//! mise Core Library
//!
//! Shared types for the mise onboarding workspace.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (TenantId, IdentityId, ProvisioningRecordId, ProfileId)
//! - [`severity`] - Outcome severity used by error reporting and operator output

pub mod ids;
pub mod severity;

pub use ids::{IdentityId, ParseIdError, ProfileId, ProvisioningRecordId, TenantId};
pub use severity::Severity;
