//! Owner credential issuing and the reversible update probe.

use std::sync::Arc;

use chrono::Utc;
use mise_clients::{ClientError, CredentialNotifier, CredentialsEmail, IdentityProvider};
use mise_core::{IdentityId, ProfileId, TenantId};
use mise_db::models::{Profile, Tenant};
use rand::distributions::{Alphanumeric, DistString};
use rand::rngs::OsRng;
use tracing::{debug, error, info, warn};

use crate::error::{TenantError, TenantResult};
use crate::models::credentials::{CredentialDispatch, ProbeReport};
use crate::stores::OnboardingStores;

/// Length of a generated temporary secret.
pub const TEMPORARY_SECRET_LEN: usize = 16;

const STEP_RESOLVE_OWNER: &str = "resolve_owner";
const STEP_VERIFY_IDENTITY: &str = "verify_identity";
const STEP_LOAD_PROFILE: &str = "load_profile";
const STEP_WRITE_MARKER: &str = "write_marker";
const STEP_REVERT: &str = "revert";

/// Service for owner credentials.
#[derive(Clone)]
pub struct CredentialService {
    notifier: Arc<dyn CredentialNotifier>,
    identities: Arc<dyn IdentityProvider>,
    stores: OnboardingStores,
    login_url: String,
}

impl CredentialService {
    pub fn new(
        notifier: Arc<dyn CredentialNotifier>,
        identities: Arc<dyn IdentityProvider>,
        stores: OnboardingStores,
        login_url: impl Into<String>,
    ) -> Self {
        Self {
            notifier,
            identities,
            stores,
            login_url: login_url.into(),
        }
    }

    /// Generate a random temporary secret.
    ///
    /// Uses `OsRng` directly from the operating system's CSPRNG. The secret
    /// always mixes lowercase, uppercase and digits.
    pub fn generate_temporary_secret() -> String {
        loop {
            let secret = Alphanumeric.sample_string(&mut OsRng, TEMPORARY_SECRET_LEN);
            let lower = secret.bytes().any(|b| b.is_ascii_lowercase());
            let upper = secret.bytes().any(|b| b.is_ascii_uppercase());
            let digit = secret.bytes().any(|b| b.is_ascii_digit());
            if lower && upper && digit {
                return secret;
            }
        }
    }

    /// Send the credentials email for a tenant owner.
    pub async fn issue(
        &self,
        tenant: &Tenant,
        owner_name: &str,
        owner_email: &str,
        temporary_secret: &str,
    ) -> TenantResult<CredentialDispatch> {
        let email = CredentialsEmail {
            recipient: owner_email.to_string(),
            owner_name: owner_name.to_string(),
            tenant_name: tenant.name.clone(),
            tenant_slug: tenant.slug.clone(),
            temporary_secret: temporary_secret.to_string(),
            login_url: self.login_url.clone(),
        };

        let receipt = self
            .notifier
            .send_credentials(&email)
            .await
            .map_err(notification_error)?;

        info!(
            tenant_id = %tenant.id,
            recipient = %owner_email,
            message_id = %receipt.message_id,
            "Credentials email dispatched"
        );

        Ok(CredentialDispatch {
            recipient: owner_email.to_string(),
            delivered_at: Utc::now(),
            message_id: receipt.message_id,
        })
    }

    /// Generate a fresh temporary secret and send it to the owner.
    pub async fn rotate(
        &self,
        tenant: &Tenant,
        owner_name: &str,
        owner_email: &str,
    ) -> TenantResult<CredentialDispatch> {
        let secret = Self::generate_temporary_secret();
        debug!(tenant_id = %tenant.id, "Rotating owner credentials");
        self.issue(tenant, owner_name, owner_email, &secret).await
    }

    /// Check that the owner's profile is writable, then put it back.
    ///
    /// Once the marker write starts, the original `full_name` is written
    /// back on every path. A failed marker write that was reverted cleanly
    /// is reported as a failed step. A failed revert is returned as
    /// [`TenantError::RevertFailed`] and wins over any earlier failure.
    pub async fn probe_reversible_update(&self, tenant_id: TenantId) -> TenantResult<ProbeReport> {
        let tenant = self
            .stores
            .tenants
            .find_tenant(tenant_id)
            .await?
            .ok_or(TenantError::TenantNotFound(tenant_id))?;

        let mut report = ProbeReport::new(tenant.id);

        let (identity_id, profile_hint) = self.resolve_owner(&tenant).await?;
        report.passed(STEP_RESOLVE_OWNER, Some(identity_id.to_string()));
        report.identity_id = Some(identity_id.into_inner());

        match self.identities.get_identity(identity_id).await {
            Ok(Some(_)) => report.passed(STEP_VERIFY_IDENTITY, None),
            Ok(None) => {
                return Err(TenantError::NotFound(format!(
                    "Identity {identity_id} does not exist in the authentication service"
                )))
            }
            Err(e) => return Err(e.into()),
        }

        let profile = match profile_hint {
            Some(profile) => profile,
            None => self
                .stores
                .links
                .find_profile_by_identity(identity_id)
                .await?
                .ok_or_else(|| {
                    TenantError::NotFound(format!("No profile linked to identity {identity_id}"))
                })?,
        };
        let profile_id = ProfileId::from_uuid(profile.id);
        let original = profile.full_name.clone();
        report.profile_id = Some(profile.id);
        report.passed(STEP_LOAD_PROFILE, None);

        let marker = format!("probe-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
        let write_result = self.write_and_verify(profile_id, &marker).await;
        match &write_result {
            Ok(()) => report.passed(STEP_WRITE_MARKER, None),
            Err(e) => report.failed(STEP_WRITE_MARKER, e.to_string()),
        }

        let revert_result = self.write_and_verify(profile_id, &original).await;

        match (write_result, revert_result) {
            (write_result, Err(revert)) => {
                let earlier = write_result.err().map(|e| e.to_string());
                error!(
                    tenant_id = %tenant_id,
                    profile_id = %profile_id,
                    error = %revert,
                    earlier = ?earlier,
                    "Probe could not restore the original profile name"
                );
                Err(TenantError::RevertFailed {
                    profile_id,
                    reason: revert.to_string(),
                    earlier,
                })
            }
            (Err(e), Ok(())) => {
                warn!(tenant_id = %tenant_id, error = %e, "Probe write failed, original restored");
                report.passed(STEP_REVERT, None);
                Ok(report)
            }
            (Ok(()), Ok(())) => {
                report.passed(STEP_REVERT, None);
                info!(tenant_id = %tenant_id, profile_id = %profile_id, "Reversible probe passed");
                Ok(report)
            }
        }
    }

    /// Find the owner identity: the completed ledger entry's requester,
    /// else the profile matching the tenant's contact email.
    async fn resolve_owner(&self, tenant: &Tenant) -> TenantResult<(IdentityId, Option<Profile>)> {
        let tenant_id = TenantId::from_uuid(tenant.id);
        if let Some(record) = self.stores.ledger.find_completed_for_tenant(tenant_id).await? {
            if let Some(requested_by) = record.requested_by {
                return Ok((IdentityId::from_uuid(requested_by), None));
            }
        }

        let profile = self
            .stores
            .links
            .find_profile_by_email(&tenant.email)
            .await?
            .ok_or_else(|| {
                TenantError::NotFound(format!("No owner found for tenant {}", tenant.slug))
            })?;

        match profile.identity_ref {
            Some(identity) => Ok((IdentityId::from_uuid(identity), Some(profile))),
            None => Err(TenantError::NotFound(format!(
                "Owner profile {} has no identity link",
                profile.id
            ))),
        }
    }

    async fn write_and_verify(&self, profile_id: ProfileId, value: &str) -> TenantResult<()> {
        self.stores
            .links
            .update_full_name(profile_id, value)
            .await?
            .ok_or_else(|| TenantError::NotFound(format!("Profile {profile_id} not found")))?;

        let stored = self
            .stores
            .links
            .find_profile(profile_id)
            .await?
            .ok_or_else(|| TenantError::NotFound(format!("Profile {profile_id} not found")))?;

        if stored.full_name == value {
            Ok(())
        } else {
            Err(TenantError::Conflict(format!(
                "Profile {profile_id} read back '{}' after writing '{value}'",
                stored.full_name
            )))
        }
    }
}

fn notification_error(err: ClientError) -> TenantError {
    match err {
        ClientError::Remote { status, message, .. } => TenantError::Notification {
            status,
            body: message,
        },
        ClientError::Conflict { message, .. } => TenantError::Notification {
            status: 409,
            body: message,
        },
        ClientError::NotFound(message) => TenantError::Notification {
            status: 404,
            body: message,
        },
        ClientError::AuthError(message) => TenantError::Notification {
            status: 401,
            body: message,
        },
        other => TenantError::from(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_temporary_secret_format() {
        let secret = CredentialService::generate_temporary_secret();
        assert_eq!(secret.len(), TEMPORARY_SECRET_LEN);
        assert!(secret.bytes().all(|b| b.is_ascii_alphanumeric()));
        assert!(secret.bytes().any(|b| b.is_ascii_uppercase()));
        assert!(secret.bytes().any(|b| b.is_ascii_lowercase()));
        assert!(secret.bytes().any(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_generate_temporary_secret_unique() {
        let a = CredentialService::generate_temporary_secret();
        let b = CredentialService::generate_temporary_secret();
        assert_ne!(a, b);
    }

    #[test]
    fn test_notification_error_keeps_body() {
        let err = notification_error(ClientError::Remote {
            status: 502,
            code: "http_502".to_string(),
            message: "SMTP relay rejected recipient domain".to_string(),
        });
        match err {
            TenantError::Notification { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "SMTP relay rejected recipient domain");
            }
            other => panic!("Expected Notification, got {other:?}"),
        }
    }

    #[test]
    fn test_notification_timeout_is_unavailable() {
        let err = notification_error(ClientError::Timeout("elapsed".to_string()));
        assert!(matches!(err, TenantError::Unavailable(_)));
    }
}
