//! Owner credential handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mise_core::TenantId;
use uuid::Uuid;

use crate::error::TenantError;
use crate::models::{CredentialDispatch, ProbeReport, SendCredentialsRequest};
use crate::router::AdminAppState;

/// POST /admin/tenants/{id}/credentials
///
/// Email temporary credentials to the tenant owner. Without a
/// `temporary_secret` in the body a new one is generated.
#[utoipa::path(
    post,
    path = "/admin/tenants/{id}/credentials",
    params(
        ("id" = Uuid, Path, description = "Tenant ID")
    ),
    request_body = SendCredentialsRequest,
    responses(
        (status = 202, description = "Credentials email dispatched", body = CredentialDispatch),
        (status = 400, description = "Validation error", body = crate::error::ErrorResponse),
        (status = 404, description = "Tenant not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Notification channel rejected the email", body = crate::error::ErrorResponse),
    ),
    tag = "Credentials"
)]
pub async fn send_credentials_handler(
    State(state): State<AdminAppState>,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<SendCredentialsRequest>,
) -> Result<(StatusCode, Json<CredentialDispatch>), TenantError> {
    if let Some(error) = request.validate() {
        return Err(TenantError::Validation(error));
    }

    let tenant_id = TenantId::from_uuid(tenant_id);
    let tenant = state
        .stores
        .tenants
        .find_tenant(tenant_id)
        .await?
        .ok_or(TenantError::TenantNotFound(tenant_id))?;

    let owner_email = request
        .owner_email
        .clone()
        .unwrap_or_else(|| tenant.email.clone());

    let dispatch = match &request.temporary_secret {
        Some(secret) => {
            state
                .credential_service
                .issue(&tenant, &request.owner_name, &owner_email, secret)
                .await?
        }
        None => {
            state
                .credential_service
                .rotate(&tenant, &request.owner_name, &owner_email)
                .await?
        }
    };

    Ok((StatusCode::ACCEPTED, Json(dispatch)))
}

/// POST /admin/tenants/{id}/credentials/probe
///
/// Write a marker to the owner's profile and restore it. A 500 with
/// `revert_failed` means the profile still holds the marker.
#[utoipa::path(
    post,
    path = "/admin/tenants/{id}/credentials/probe",
    params(
        ("id" = Uuid, Path, description = "Tenant ID")
    ),
    responses(
        (status = 200, description = "Probe finished and reverted", body = ProbeReport),
        (status = 404, description = "Tenant, owner or profile not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Revert failed", body = crate::error::ErrorResponse),
    ),
    tag = "Credentials"
)]
pub async fn probe_credentials_handler(
    State(state): State<AdminAppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<ProbeReport>, TenantError> {
    let report = state
        .credential_service
        .probe_reversible_update(TenantId::from_uuid(tenant_id))
        .await?;
    Ok(Json(report))
}
