//! Request and response models for the onboarding admin API.

pub mod credentials;
pub mod provision;
pub mod reconciliation;
pub mod slugs;

pub use credentials::{CredentialDispatch, ProbeReport, ProbeStep, SendCredentialsRequest, StepOutcome};
pub use provision::{
    validate_payload, FailRecordRequest, FieldError, ProvisionOutcome, ProvisioningRecordView,
};
pub use reconciliation::{
    BrokenIdentityLink, OrphanedTenant, RecentTenant, ReconciliationReport,
    ReconciliationSummary, StalePendingRecord, SweepRun, TenantView,
};
pub use slugs::{AllocateSlugRequest, AllocateSlugResponse, SlugAvailabilityResponse};
