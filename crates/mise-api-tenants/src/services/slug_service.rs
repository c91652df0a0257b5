//! Slug generation service for unique tenant slugs.

use std::sync::Arc;

use tracing::{debug, info, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::{TenantError, TenantResult};
use crate::services::availability_service::{AvailabilityService, SlugAvailability};

/// Minimum length of a slug.
pub const MIN_SLUG_LEN: usize = 3;

/// Suffix appended to slugs shorter than [`MIN_SLUG_LEN`].
pub const SHORT_SLUG_SUFFIX: &str = "restaurant";

/// Highest numeric suffix the allocator tries (`base-2` through `base-100`).
pub const MAX_SUFFIX: u32 = 100;

/// Service for generating unique tenant slugs.
#[derive(Clone)]
pub struct SlugService {
    availability: Arc<AvailabilityService>,
}

impl SlugService {
    /// Create a new slug service.
    pub fn new(availability: Arc<AvailabilityService>) -> Self {
        Self { availability }
    }

    /// Generate a URL-safe slug from a display name.
    ///
    /// Transforms the name by:
    /// - Converting to lowercase
    /// - Folding accented letters to ASCII (`é` becomes `e`)
    /// - Replacing whitespace and underscores with hyphens
    /// - Removing every other character outside `[a-z0-9-]`
    /// - Collapsing multiple hyphens and trimming them from the edges
    /// - Padding results shorter than three characters with `-restaurant`
    ///
    /// This is a pure function that doesn't require database access.
    pub fn normalize(name: &str) -> String {
        let mut slug = String::with_capacity(name.len());
        let mut pending_hyphen = false;

        for c in name.to_lowercase().nfkd() {
            if is_combining_mark(c) {
                continue;
            }
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c);
            } else if c.is_whitespace() || c == '_' || c == '-' {
                pending_hyphen = true;
            }
        }

        if slug.is_empty() {
            SHORT_SLUG_SUFFIX.to_string()
        } else if slug.len() < MIN_SLUG_LEN {
            format!("{slug}-{SHORT_SLUG_SUFFIX}")
        } else {
            slug
        }
    }

    /// Returns `true` if `slug` is already in normalized form.
    pub fn is_valid_slug(slug: &str) -> bool {
        slug.len() >= MIN_SLUG_LEN
            && slug
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
            && !slug.starts_with('-')
            && !slug.ends_with('-')
            && !slug.contains("--")
    }

    /// Allocate a free slug for a display name.
    ///
    /// Tries the normalized base first, then `base-2` up to `base-100`,
    /// one candidate at a time. The result is advisory: the store's unique
    /// constraint arbitrates at creation time.
    pub async fn allocate(&self, name: &str) -> TenantResult<String> {
        let base = Self::normalize(name);

        if self.probe(&base).await? {
            info!(slug = %base, "Allocated slug");
            return Ok(base);
        }

        for counter in 2..=MAX_SUFFIX {
            let candidate = format!("{base}-{counter}");
            if self.probe(&candidate).await? {
                info!(slug = %candidate, base = %base, "Allocated suffixed slug");
                return Ok(candidate);
            }
        }

        let attempts = MAX_SUFFIX - 1;
        warn!(base = %base, attempts, "Slug allocation exhausted");
        Err(TenantError::AllocationExhausted { base, attempts })
    }

    /// Check a single caller-supplied slug.
    ///
    /// Returns `Ok(())` only when the slug is well formed and free.
    pub async fn check(&self, slug: &str) -> TenantResult<()> {
        if !Self::is_valid_slug(slug) {
            return Err(TenantError::validation_field(
                "slug",
                "Slug must be at least 3 characters of a-z, 0-9 and single inner hyphens",
            ));
        }

        match self.availability.check(slug).await {
            SlugAvailability::Available => Ok(()),
            SlugAvailability::CheckFailed { source } => Err(TenantError::Unavailable(format!(
                "{} check failed for slug '{slug}'",
                source.as_str()
            ))),
            taken => Err(TenantError::SlugUnavailable {
                slug: slug.to_string(),
                reason: taken.to_string(),
            }),
        }
    }

    /// `Ok(true)` if the candidate is free. A failed lookup aborts the
    /// allocation instead of moving on to the next suffix.
    async fn probe(&self, candidate: &str) -> TenantResult<bool> {
        let availability = self.availability.check(candidate).await;
        debug!(candidate = %candidate, result = %availability, "Probed slug");
        match availability {
            SlugAvailability::Available => Ok(true),
            SlugAvailability::CheckFailed { source } => Err(TenantError::Unavailable(format!(
                "{} check failed while allocating '{candidate}'",
                source.as_str()
            ))),
            SlugAvailability::ClaimedByTenant | SlugAvailability::ClaimedByProvisioning => {
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_simple() {
        assert_eq!(SlugService::normalize("La Piazza"), "la-piazza");
    }

    #[test]
    fn test_normalize_lowercase() {
        assert_eq!(SlugService::normalize("LA PIAZZA"), "la-piazza");
    }

    #[test]
    fn test_normalize_accents() {
        assert_eq!(SlugService::normalize("My Café!!"), "my-cafe");
        assert_eq!(SlugService::normalize("Crème Brûlée"), "creme-brulee");
        assert_eq!(SlugService::normalize("Ñoño's Taquería"), "nonos-taqueria");
    }

    #[test]
    fn test_normalize_underscores() {
        assert_eq!(SlugService::normalize("Sushi_Bar"), "sushi-bar");
    }

    #[test]
    fn test_normalize_special_chars() {
        assert_eq!(SlugService::normalize("Fish & Chips!@#$%"), "fish-chips");
        assert_eq!(SlugService::normalize("Rock&Roll Diner"), "rockroll-diner");
    }

    #[test]
    fn test_normalize_leading_trailing() {
        assert_eq!(SlugService::normalize("  --La Piazza--  "), "la-piazza");
    }

    #[test]
    fn test_normalize_with_numbers() {
        assert_eq!(SlugService::normalize("Pier 39 Grill"), "pier-39-grill");
    }

    #[test]
    fn test_normalize_mixed_separators() {
        assert_eq!(
            SlugService::normalize("  Chez--Marie__Bistro  "),
            "chez-marie-bistro"
        );
    }

    #[test]
    fn test_normalize_short_names_padded() {
        assert_eq!(SlugService::normalize("Bo"), "bo-restaurant");
        assert_eq!(SlugService::normalize("!!!"), "restaurant");
        assert_eq!(SlugService::normalize(""), "restaurant");
        assert_eq!(SlugService::normalize("寿司"), "restaurant");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(SlugService::is_valid_slug("la-piazza"));
        assert!(SlugService::is_valid_slug("pier-39"));
        assert!(!SlugService::is_valid_slug("ab"));
        assert!(!SlugService::is_valid_slug("-la-piazza"));
        assert!(!SlugService::is_valid_slug("la-piazza-"));
        assert!(!SlugService::is_valid_slug("la--piazza"));
        assert!(!SlugService::is_valid_slug("La-Piazza"));
        assert!(!SlugService::is_valid_slug("la_piazza"));
    }
}
