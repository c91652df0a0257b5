//! Shared HTTP plumbing for the remote clients (reqwest-based).

use crate::error::{ClientError, ClientResult};
use crate::session::SessionAuth;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Error envelope returned by the remote services: `{ "code", "message" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Build a `reqwest::Client` with the given timeout.
///
/// Every outbound call inherits this timeout; a timed-out call surfaces as
/// [`ClientError::Timeout`].
pub fn build_http_client(timeout: Duration) -> ClientResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("mise-clients/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ClientError::InvalidConfig(format!("Failed to build HTTP client: {e}")))
}

/// Base URL + auth + pooled client, cloned into each typed client.
#[derive(Debug, Clone)]
pub struct RemoteHttp {
    base_url: String,
    auth: SessionAuth,
    http_client: Client,
}

impl RemoteHttp {
    /// Create a transport. The trailing slash of `base_url` is stripped.
    #[must_use]
    pub fn new(base_url: impl Into<String>, auth: SessionAuth, http_client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            auth,
            http_client,
        }
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Borrow the auth handler.
    #[must_use]
    pub fn auth(&self) -> &SessionAuth {
        &self.auth
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        let mut builder = self.http_client.get(&url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        let builder = self.auth.apply(builder).await?;
        let response = builder.send().await?;
        self.handle_response(response).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        debug!("POST {}", url);
        let builder = self.http_client.post(&url);
        let builder = self.auth.apply(builder).await?;
        let response = builder.json(body).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| ClientError::ParseError(format!("Failed to parse response: {e}")))
        } else {
            self.handle_error_response(response).await
        }
    }

    async fn handle_error_response<T>(&self, response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());

        let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => (envelope.code, envelope.message),
            Err(_) => {
                let message = if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                };
                (format!("http_{}", status.as_u16()), message)
            }
        };

        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
            StatusCode::CONFLICT => Err(ClientError::Conflict { code, message }),
            StatusCode::UNAUTHORIZED => {
                self.auth.invalidate_cache().await;
                Err(ClientError::AuthError(format!(
                    "Authentication failed (401): {message}"
                )))
            }
            _ => {
                if status.is_server_error() {
                    warn!(status = status.as_u16(), code = %code, "Remote service error");
                }
                Err(ClientError::Remote {
                    status: status.as_u16(),
                    code,
                    message,
                })
            }
        }
    }
}
