//! Authentication service client (identity lookups and session refresh).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mise_core::IdentityId;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::http::RemoteHttp;
use crate::session::Session;

/// A login identity as reported by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
    #[serde(default)]
    pub email_confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct IdentityList {
    #[serde(default)]
    users: Vec<Identity>,
}

/// Read access to the authentication service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up an identity by id. `Ok(None)` when it does not exist.
    async fn get_identity(&self, id: IdentityId) -> ClientResult<Option<Identity>>;

    /// Look up an identity by email. `Ok(None)` when none matches.
    async fn find_identity_by_email(&self, email: &str) -> ClientResult<Option<Identity>>;

    /// Refresh the service session used for admin calls.
    async fn refresh_session(&self) -> ClientResult<Session>;
}

/// HTTP implementation of [`IdentityProvider`].
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: RemoteHttp,
}

impl AuthClient {
    /// Create a client over a configured transport.
    #[must_use]
    pub fn new(http: RemoteHttp) -> Self {
        Self { http }
    }
}

#[async_trait]
impl IdentityProvider for AuthClient {
    async fn get_identity(&self, id: IdentityId) -> ClientResult<Option<Identity>> {
        let path = format!("/admin/users/{id}");
        match self.http.get::<Identity>(&path, &[]).await {
            Ok(identity) => Ok(Some(identity)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_identity_by_email(&self, email: &str) -> ClientResult<Option<Identity>> {
        let list: IdentityList = self.http.get("/admin/users", &[("email", email)]).await?;
        Ok(list
            .users
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn refresh_session(&self) -> ClientResult<Session> {
        self.http.auth().refresh_session().await
    }
}
