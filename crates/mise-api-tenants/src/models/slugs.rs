//! Slug allocation DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::SlugAvailability;

/// Request body for `POST /slugs/allocate`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AllocateSlugRequest {
    /// Restaurant display name to derive the slug from.
    #[schema(example = "My Café")]
    pub name: String,
}

impl AllocateSlugRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Some("name is required".to_string());
        }
        if name.chars().count() > 200 {
            return Some("name must be at most 200 characters".to_string());
        }
        None
    }
}

/// Allocated slug.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AllocateSlugResponse {
    #[schema(example = "my-cafe")]
    pub slug: String,
}

/// Response for `GET /slugs/{slug}/availability`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SlugAvailabilityResponse {
    pub slug: String,
    pub available: bool,
    pub availability: SlugAvailability,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_request_validation() {
        let empty = AllocateSlugRequest {
            name: "   ".to_string(),
        };
        assert_eq!(empty.validate(), Some("name is required".to_string()));

        let long = AllocateSlugRequest {
            name: "x".repeat(201),
        };
        assert!(long.validate().is_some());

        let ok = AllocateSlugRequest {
            name: "My Café".to_string(),
        };
        assert_eq!(ok.validate(), None);
    }
}
