//! Slug commands - allocate a slug for a name, check one slug

use clap::Args;
use mise_api_tenants::models::{AllocateSlugResponse, SlugAvailabilityResponse};
use mise_api_tenants::services::{SlugAvailability, SlugService};
use mise_api_tenants::TenantError;

use crate::context::AdminContext;
use crate::error::{CliError, CliResult};
use crate::output::{print_key_value, print_success, print_warning};

/// Arguments for the allocate-slug command
#[derive(Debug, Args)]
pub struct AllocateSlugArgs {
    /// Business name to derive the slug from
    pub name: String,
}

/// Arguments for the check-slug command
#[derive(Debug, Args)]
pub struct CheckSlugArgs {
    /// Normalized slug to check
    pub slug: String,
}

/// Execute the allocate-slug command
pub async fn allocate(args: AllocateSlugArgs, ctx: &AdminContext, json: bool) -> CliResult<()> {
    if args.name.trim().is_empty() {
        return Err(CliError::Validation("Name must not be empty".to_string()));
    }

    let slug = ctx.slug_service().allocate(&args.name).await?;

    if json {
        crate::output::print_json(&AllocateSlugResponse { slug })
    } else {
        print_success(&format!("Allocated slug '{slug}'"));
        Ok(())
    }
}

/// Execute the check-slug command
///
/// A failed lookup is reported as an error, never as "available".
pub async fn check(args: CheckSlugArgs, ctx: &AdminContext, json: bool) -> CliResult<()> {
    if !SlugService::is_valid_slug(&args.slug) {
        return Err(CliError::Validation(format!(
            "'{}' is not a normalized slug (try '{}')",
            args.slug,
            SlugService::normalize(&args.slug)
        )));
    }

    let availability = ctx.availability_service().check(&args.slug).await;

    if json {
        crate::output::print_json(&SlugAvailabilityResponse {
            slug: args.slug.clone(),
            available: availability.is_available(),
            availability,
        })?;
    } else if availability.is_available() {
        print_success(&format!("'{}' is available", args.slug));
    } else {
        print_warning(&format!("'{}' is not available", args.slug));
        print_key_value("Reason", &availability.to_string());
    }

    match availability {
        SlugAvailability::Available => Ok(()),
        SlugAvailability::CheckFailed { source } => Err(TenantError::Unavailable(format!(
            "Could not verify '{}' against the {}",
            args.slug,
            source.as_str()
        ))
        .into()),
        taken => Err(TenantError::SlugUnavailable {
            slug: args.slug,
            reason: taken.to_string(),
        }
        .into()),
    }
}
