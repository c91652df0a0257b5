//! `OpenAPI` document for the admin HTTP surface.

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use mise_api_tenants::error::ErrorResponse;
use mise_api_tenants::models::{
    AllocateSlugRequest, AllocateSlugResponse, BrokenIdentityLink, CredentialDispatch,
    FailRecordRequest, OrphanedTenant, ProbeReport, ProbeStep, ProvisionOutcome,
    ProvisioningRecordView, RecentTenant, ReconciliationReport, ReconciliationSummary,
    SendCredentialsRequest, SlugAvailabilityResponse, StalePendingRecord, StepOutcome, SweepRun,
    TenantView,
};
use mise_api_tenants::services::{SlugAvailability, SlugSource};
use mise_clients::{
    BillingCycle, BillingPlan, BusinessProfile, FeatureFlags, OnboardingPayload, OwnerIdentity,
    PlanSelection,
};

/// `OpenAPI` documentation for the onboarding admin API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "mise onboarding admin API",
        version = "0.1.0",
        description = "Slug allocation, tenant provisioning, reconciliation and owner credentials"
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server")
    ),
    tags(
        (name = "Slugs", description = "Slug normalization, allocation and availability"),
        (name = "Provisioning", description = "Submit onboarding payloads"),
        (name = "Reconciliation", description = "Registry and ledger consistency"),
        (name = "Credentials", description = "Owner credentials and the reversible probe")
    ),
    paths(
        mise_api_tenants::handlers::slugs::allocate_slug_handler,
        mise_api_tenants::handlers::slugs::slug_availability_handler,
        mise_api_tenants::handlers::provision::provision_handler,
        mise_api_tenants::handlers::reconciliation::reconciliation_handler,
        mise_api_tenants::handlers::reconciliation::fail_pending_record_handler,
        mise_api_tenants::handlers::credentials::send_credentials_handler,
        mise_api_tenants::handlers::credentials::probe_credentials_handler,
    ),
    components(schemas(
        ErrorResponse,
        AllocateSlugRequest,
        AllocateSlugResponse,
        SlugAvailabilityResponse,
        SlugAvailability,
        SlugSource,
        OnboardingPayload,
        BusinessProfile,
        OwnerIdentity,
        PlanSelection,
        BillingPlan,
        BillingCycle,
        FeatureFlags,
        ProvisionOutcome,
        FailRecordRequest,
        ProvisioningRecordView,
        SweepRun,
        ReconciliationReport,
        ReconciliationSummary,
        TenantView,
        RecentTenant,
        BrokenIdentityLink,
        OrphanedTenant,
        StalePendingRecord,
        SendCredentialsRequest,
        CredentialDispatch,
        ProbeReport,
        ProbeStep,
        StepOutcome,
    ))
)]
pub struct ApiDoc;

/// Router serving the document at `/openapi.json`.
pub fn openapi_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}
