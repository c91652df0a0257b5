//! Strongly Typed Identifiers
//!
//! Newtype wrappers around [`Uuid`] for the identifiers that cross the
//! onboarding core. Passing an identity reference where a tenant id is
//! expected does not compile.
//!
//! # Example
//!
//! ```
//! use mise_core::{IdentityId, TenantId};
//!
//! let tenant = TenantId::new();
//! let owner = IdentityId::new();
//!
//! fn requires_tenant(id: TenantId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_tenant(tenant);
//! // requires_tenant(owner); // This would not compile!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying UUID parse error message
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID type
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Consumes the ID and returns the underlying UUID.
            #[must_use]
            pub fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_id!(
    /// Identifier of an onboarded restaurant tenant.
    ///
    /// # Example
    ///
    /// ```
    /// use mise_core::TenantId;
    /// use uuid::Uuid;
    ///
    /// let uuid = Uuid::new_v4();
    /// let tenant_id = TenantId::from_uuid(uuid);
    /// assert_eq!(tenant_id.as_uuid(), &uuid);
    ///
    /// let parsed: TenantId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
    /// ```
    TenantId
);

define_id!(
    /// Identifier of a login identity held by the authentication service.
    IdentityId
);

define_id!(
    /// Identifier of one entry in the provisioning ledger.
    ProvisioningRecordId
);

define_id!(
    /// Identifier of an identity-link (profile) row.
    ProfileId
);

#[cfg(test)]
mod tests {
    use super::*;

    mod tenant_id_tests {
        use super::*;

        #[test]
        fn test_new_creates_valid_id() {
            let id = TenantId::new();
            let id_str = id.to_string();
            // UUID format: 8-4-4-4-12 hex digits
            assert_eq!(id_str.len(), 36);
            assert!(id_str.contains('-'));
        }

        #[test]
        fn test_from_uuid_preserves_value() {
            let uuid = Uuid::new_v4();
            let id = TenantId::from_uuid(uuid);
            assert_eq!(id.as_uuid(), &uuid);
            assert_eq!(id.into_inner(), uuid);
        }

        #[test]
        fn test_display_returns_uuid_string() {
            let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
            let id = TenantId::from_uuid(uuid);
            assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
        }

        #[test]
        fn test_default_creates_new_id() {
            assert_ne!(TenantId::default(), TenantId::default());
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_valid() {
            let id: IdentityId = "123e4567-e89b-12d3-a456-426614174000".parse().unwrap();
            assert_eq!(id.to_string(), "123e4567-e89b-12d3-a456-426614174000");
        }

        #[test]
        fn test_parse_invalid_names_the_type() {
            let err = "not-a-uuid".parse::<ProvisioningRecordId>().unwrap_err();
            assert_eq!(err.id_type, "ProvisioningRecordId");
            assert!(err.to_string().starts_with("Failed to parse ProvisioningRecordId"));
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn test_serializes_as_plain_string() {
            let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
            let id = ProfileId::from_uuid(uuid);
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
        }
    }
}
