//! Provisioning handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use mise_clients::OnboardingPayload;

use crate::error::TenantError;
use crate::models::ProvisionOutcome;
use crate::router::AdminAppState;

/// POST /tenants/provision
///
/// Submit a fully assembled onboarding payload to the provisioning service.
///
/// # Errors
///
/// - 400 Bad Request: malformed body or invalid field (named in `field`)
/// - 409 Conflict: `slug_taken`, allocate a new slug and resubmit
/// - 502 Bad Gateway: the provisioning service answered with an error envelope
/// - 503 Service Unavailable: the provisioning service timed out or is unreachable
#[utoipa::path(
    post,
    path = "/tenants/provision",
    request_body = OnboardingPayload,
    responses(
        (status = 201, description = "Tenant provisioned", body = ProvisionOutcome),
        (status = 400, description = "Validation error", body = crate::error::ErrorResponse),
        (status = 409, description = "Slug taken", body = crate::error::ErrorResponse),
        (status = 502, description = "Provisioning service error", body = crate::error::ErrorResponse),
        (status = 503, description = "Provisioning service unavailable", body = crate::error::ErrorResponse),
    ),
    tag = "Provisioning"
)]
pub async fn provision_handler(
    State(state): State<AdminAppState>,
    payload: Result<Json<OnboardingPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ProvisionOutcome>), TenantError> {
    let Json(payload) =
        payload.map_err(|e| TenantError::Validation(format!("Invalid JSON: {}", e.body_text())))?;

    let outcome = state.provisioning_service.submit(&payload).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
