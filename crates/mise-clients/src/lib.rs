//! HTTP clients for the services the onboarding core consumes.
//!
//! - [`provisioning::ProvisioningClient`] - remote tenant creation
//! - [`identity::AuthClient`] - identity lookups and session refresh
//! - [`notification::NotificationClient`] - credentials email
//!
//! Each client sits behind a trait ([`RemoteProvisioner`], [`IdentityProvider`],
//! [`CredentialNotifier`]) so services can be exercised without a network.
//! Clients never retry; a timeout or transport failure is returned as a
//! [`ClientError`] and callers treat it as failure.

pub mod error;
pub mod http;
pub mod identity;
pub mod notification;
pub mod provisioning;
pub mod session;

pub use error::{ClientError, ClientResult};
pub use http::{build_http_client, ErrorEnvelope, RemoteHttp};
pub use identity::{AuthClient, Identity, IdentityProvider};
pub use notification::{CredentialNotifier, CredentialsEmail, NotificationClient, NotificationReceipt};
pub use provisioning::{
    BillingCycle, BillingPlan, BusinessProfile, CreatedTenant, FeatureFlags, OnboardingPayload,
    OwnerIdentity, PlanSelection, ProvisioningClient, RemoteProvisioner,
};
pub use session::{ServiceCredentials, Session, SessionAuth};
