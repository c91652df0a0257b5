//! Service authentication: static bearer token or a refreshable session.

use crate::error::{ClientError, ClientResult};
use reqwest::RequestBuilder;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Credentials used to authenticate against a remote service.
///
/// The [`Debug`] impl redacts secrets so credentials never reach log output.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceCredentials {
    /// Long-lived bearer token (service key).
    Bearer { token: String },

    /// Refresh-token grant against the authentication service.
    RefreshToken {
        token_endpoint: String,
        refresh_token: String,
    },
}

impl std::fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"[REDACTED]")
                .finish(),
            Self::RefreshToken { token_endpoint, .. } => f
                .debug_struct("RefreshToken")
                .field("token_endpoint", token_endpoint)
                .field("refresh_token", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Token endpoint response for the refresh grant.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// An access token obtained from the authentication service.
#[derive(Clone)]
pub struct Session {
    /// Bearer token to present on requests.
    pub access_token: String,
    /// When the token stops being usable. `None` for static tokens.
    pub expires_at: Option<Instant>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Session {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => Instant::now() >= exp,
            None => false,
        }
    }
}

/// Authentication handler shared by the remote clients.
///
/// The cached session and the current refresh token are shared across
/// clones, so every client built from the same handler reuses one session.
#[derive(Debug, Clone)]
pub struct SessionAuth {
    credentials: ServiceCredentials,
    session: Arc<RwLock<Option<Session>>>,
    /// Refresh tokens may rotate on every refresh.
    refresh_token: Arc<RwLock<Option<String>>>,
    http_client: reqwest::Client,
}

impl SessionAuth {
    /// Create a new auth handler.
    #[must_use]
    pub fn new(credentials: ServiceCredentials, http_client: reqwest::Client) -> Self {
        let refresh_token = match &credentials {
            ServiceCredentials::RefreshToken { refresh_token, .. } => Some(refresh_token.clone()),
            ServiceCredentials::Bearer { .. } => None,
        };
        Self {
            credentials,
            session: Arc::new(RwLock::new(None)),
            refresh_token: Arc::new(RwLock::new(refresh_token)),
            http_client,
        }
    }

    /// Shorthand for a static bearer token.
    #[must_use]
    pub fn bearer(token: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self::new(
            ServiceCredentials::Bearer {
                token: token.into(),
            },
            http_client,
        )
    }

    /// Return the current session, refreshing it when missing or expired.
    pub async fn get_session(&self) -> ClientResult<Session> {
        if let ServiceCredentials::Bearer { token } = &self.credentials {
            return Ok(Session {
                access_token: token.clone(),
                expires_at: None,
            });
        }

        {
            let cache = self.session.read().await;
            if let Some(session) = cache.as_ref() {
                if !session.is_expired() {
                    return Ok(session.clone());
                }
            }
        }

        self.refresh_session().await
    }

    /// Force a refresh-token exchange and cache the new session.
    ///
    /// For bearer credentials this returns the static token.
    pub async fn refresh_session(&self) -> ClientResult<Session> {
        let token_endpoint = match &self.credentials {
            ServiceCredentials::Bearer { token } => {
                return Ok(Session {
                    access_token: token.clone(),
                    expires_at: None,
                })
            }
            ServiceCredentials::RefreshToken { token_endpoint, .. } => token_endpoint,
        };

        let refresh_token = self
            .refresh_token
            .read()
            .await
            .clone()
            .ok_or_else(|| ClientError::AuthError("No refresh token available".to_string()))?;

        debug!("Refreshing session at {}", token_endpoint);
        let response = self
            .http_client
            .post(token_endpoint)
            .query(&[("grant_type", "refresh_token")])
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| ClientError::AuthError(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(ClientError::AuthError(format!(
                "Token endpoint returned {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            ClientError::AuthError(format!("Failed to parse token response: {e}"))
        })?;

        // Expire 30 seconds early to avoid presenting a token at its deadline.
        let expires_at = token_response
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs.saturating_sub(30)));

        if let Some(rotated) = token_response.refresh_token {
            *self.refresh_token.write().await = Some(rotated);
        }

        let session = Session {
            access_token: token_response.access_token,
            expires_at,
        };
        *self.session.write().await = Some(session.clone());

        Ok(session)
    }

    /// Apply authentication to a request builder.
    pub async fn apply(&self, builder: RequestBuilder) -> ClientResult<RequestBuilder> {
        let session = self.get_session().await?;
        Ok(builder.bearer_auth(session.access_token))
    }

    /// Drop the cached session (e.g. on a 401 response).
    pub async fn invalidate_cache(&self) {
        *self.session.write().await = None;
    }
}
