//! Reconciliation handlers: the sweep report and the stuck-record action.

use axum::{
    extract::{Path, State},
    Json,
};
use mise_core::ProvisioningRecordId;
use uuid::Uuid;

use crate::error::TenantError;
use crate::models::{FailRecordRequest, ProvisioningRecordView, SweepRun};
use crate::router::AdminAppState;

/// GET /admin/reconciliation
///
/// Run the read-only reconciliation sweep and return its report.
#[utoipa::path(
    get,
    path = "/admin/reconciliation",
    responses(
        (status = 200, description = "Sweep report", body = SweepRun),
        (status = 503, description = "A store is unreachable", body = crate::error::ErrorResponse),
    ),
    tag = "Reconciliation"
)]
pub async fn reconciliation_handler(
    State(state): State<AdminAppState>,
) -> Result<Json<SweepRun>, TenantError> {
    let run = state.reconciliation_service.run().await?;
    Ok(Json(run))
}

/// POST /admin/provisioning/{id}/fail
///
/// Mark a stuck `pending` provisioning record as `failed`.
#[utoipa::path(
    post,
    path = "/admin/provisioning/{id}/fail",
    params(
        ("id" = Uuid, Path, description = "Provisioning record ID")
    ),
    request_body = FailRecordRequest,
    responses(
        (status = 200, description = "Record marked failed", body = ProvisioningRecordView),
        (status = 400, description = "Validation error", body = crate::error::ErrorResponse),
        (status = 404, description = "Record not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Record is not pending", body = crate::error::ErrorResponse),
    ),
    tag = "Reconciliation"
)]
pub async fn fail_pending_record_handler(
    State(state): State<AdminAppState>,
    Path(record_id): Path<Uuid>,
    Json(request): Json<FailRecordRequest>,
) -> Result<Json<ProvisioningRecordView>, TenantError> {
    if let Some(error) = request.validate() {
        return Err(TenantError::validation_field("reason", error));
    }

    let record = state
        .reconciliation_service
        .fail_stuck_pending(ProvisioningRecordId::from_uuid(record_id), &request.reason)
        .await?;
    Ok(Json(ProvisioningRecordView::from(&record)))
}
