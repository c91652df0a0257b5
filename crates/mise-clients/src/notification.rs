//! Notification channel client (credentials email).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ClientResult;
use crate::http::RemoteHttp;

/// Body of a credentials email.
///
/// `Debug` redacts the temporary secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsEmail {
    pub recipient: String,
    pub owner_name: String,
    pub tenant_name: String,
    pub tenant_slug: String,
    pub temporary_secret: String,
    pub login_url: String,
}

impl std::fmt::Debug for CredentialsEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsEmail")
            .field("recipient", &self.recipient)
            .field("owner_name", &self.owner_name)
            .field("tenant_name", &self.tenant_name)
            .field("tenant_slug", &self.tenant_slug)
            .field("temporary_secret", &"[REDACTED]")
            .field("login_url", &self.login_url)
            .finish()
    }
}

/// Acknowledgement from the notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationReceipt {
    /// Channel-side message id.
    pub message_id: String,
}

/// Sends credential notifications.
#[async_trait]
pub trait CredentialNotifier: Send + Sync {
    /// Deliver one credentials email.
    async fn send_credentials(&self, email: &CredentialsEmail) -> ClientResult<NotificationReceipt>;
}

/// HTTP implementation of [`CredentialNotifier`].
#[derive(Debug, Clone)]
pub struct NotificationClient {
    http: RemoteHttp,
}

impl NotificationClient {
    /// Create a client over a configured transport.
    #[must_use]
    pub fn new(http: RemoteHttp) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CredentialNotifier for NotificationClient {
    async fn send_credentials(&self, email: &CredentialsEmail) -> ClientResult<NotificationReceipt> {
        let receipt: NotificationReceipt = self.http.post("/emails/credentials", email).await?;
        info!(
            message_id = %receipt.message_id,
            tenant_slug = %email.tenant_slug,
            "Credentials email accepted"
        );
        Ok(receipt)
    }
}
