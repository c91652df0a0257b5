//! Slug allocation and availability handlers.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::TenantError;
use crate::models::{AllocateSlugRequest, AllocateSlugResponse, SlugAvailabilityResponse};
use crate::router::AdminAppState;
use crate::services::SlugService;

/// POST /slugs/allocate
///
/// Derive a free slug from a restaurant name. The slug is not reserved;
/// submit it with the onboarding payload and re-allocate on `slug_taken`.
#[utoipa::path(
    post,
    path = "/slugs/allocate",
    request_body = AllocateSlugRequest,
    responses(
        (status = 200, description = "Slug allocated", body = AllocateSlugResponse),
        (status = 400, description = "Validation error", body = crate::error::ErrorResponse),
        (status = 422, description = "Every suffix is taken", body = crate::error::ErrorResponse),
        (status = 503, description = "A store is unreachable", body = crate::error::ErrorResponse),
    ),
    tag = "Slugs"
)]
pub async fn allocate_slug_handler(
    State(state): State<AdminAppState>,
    Json(request): Json<AllocateSlugRequest>,
) -> Result<Json<AllocateSlugResponse>, TenantError> {
    if let Some(error) = request.validate() {
        return Err(TenantError::validation_field("name", error));
    }

    let slug = state.slug_service.allocate(&request.name).await?;
    Ok(Json(AllocateSlugResponse { slug }))
}

/// GET /slugs/{slug}/availability
///
/// Report whether a normalized slug is free in both the tenant registry and
/// the provisioning ledger. A failed lookup reports `check_failed`.
#[utoipa::path(
    get,
    path = "/slugs/{slug}/availability",
    params(
        ("slug" = String, Path, description = "Normalized slug to check")
    ),
    responses(
        (status = 200, description = "Availability", body = SlugAvailabilityResponse),
        (status = 400, description = "Slug is not normalized", body = crate::error::ErrorResponse),
    ),
    tag = "Slugs"
)]
pub async fn slug_availability_handler(
    State(state): State<AdminAppState>,
    Path(slug): Path<String>,
) -> Result<Json<SlugAvailabilityResponse>, TenantError> {
    if !SlugService::is_valid_slug(&slug) {
        return Err(TenantError::validation_field(
            "slug",
            format!("'{slug}' is not a normalized slug"),
        ));
    }

    let availability = state.availability_service.check(&slug).await;
    Ok(Json(SlugAvailabilityResponse {
        available: availability.is_available(),
        slug,
        availability,
    }))
}
