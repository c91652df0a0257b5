//! Admin configuration loaded from environment variables.
//!
//! Loading is fail-fast: a required variable that is missing, or any variable
//! holding a value that does not parse, stops the process before it touches a
//! store or a remote service.

use std::env;
use std::time::Duration;

use mise_api_tenants::services::reconciliation_service::{
    DEFAULT_RECENT_LIMIT, DEFAULT_SENTINEL_EMAIL, DEFAULT_STALE_PENDING_HOURS,
};
use mise_api_tenants::services::ReconciliationConfig;
use thiserror::Error;

/// Default timeout for outbound HTTP calls.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Largest accepted `RECONCILE_LIMIT`.
pub const MAX_RECONCILE_LIMIT: usize = 1000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Failed to parse port: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Base URL and credential for one remote service.
#[derive(Clone)]
pub struct RemoteEndpoint {
    pub base_url: String,
    pub token: String,
}

impl std::fmt::Debug for RemoteEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEndpoint")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// How the admin authenticates against the authentication service.
#[derive(Clone)]
pub enum AuthCredential {
    /// Static service key.
    ServiceKey(String),
    /// Refresh token exchanged at `{AUTH_API_URL}/token`.
    RefreshToken(String),
}

impl std::fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceKey(_) => f.write_str("ServiceKey([REDACTED])"),
            Self::RefreshToken(_) => f.write_str("RefreshToken([REDACTED])"),
        }
    }
}

/// Authentication service settings.
#[derive(Debug, Clone)]
pub struct AuthEndpoint {
    pub base_url: String,
    pub credential: AuthCredential,
}

/// Everything `mise-admin` reads from the environment.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// PostgreSQL connection string.
    pub database_url: String,

    /// Remote provisioning service. Only commands that create tenants need it.
    pub provisioning: Option<RemoteEndpoint>,

    /// Authentication service.
    pub auth: Option<AuthEndpoint>,

    /// Notification channel.
    pub notify: Option<RemoteEndpoint>,

    /// Timeout applied to every outbound HTTP call.
    pub http_timeout: Duration,

    /// Reconciliation tunables.
    pub reconciliation: ReconciliationConfig,

    /// Login URL embedded in credentials emails.
    pub login_url: String,

    pub host: String,
    pub port: u16,

    /// Tracing filter directive (e.g. "info,mise=debug").
    pub rust_log: String,
}

impl AdminConfig {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first if present.
    ///
    /// # Required Variables
    ///
    /// - `DATABASE_URL` - PostgreSQL connection string
    ///
    /// # Optional Variables
    ///
    /// - `PROVISIONING_API_URL` / `PROVISIONING_API_TOKEN`
    /// - `AUTH_API_URL` with `AUTH_SERVICE_KEY` or `AUTH_REFRESH_TOKEN`
    /// - `NOTIFY_API_URL` / `NOTIFY_API_TOKEN`
    /// - `HTTP_TIMEOUT_SECS` (default: 10)
    /// - `SENTINEL_ADMIN_EMAIL` (default: "admin@example.com")
    /// - `RECONCILE_LIMIT` (default: 10)
    /// - `STALE_PENDING_HOURS` (default: 24)
    /// - `LOGIN_URL` (default: "http://localhost:3000/login")
    /// - `HOST` / `PORT` (default: 0.0.0.0:8080)
    /// - `RUST_LOG` (default: "info,mise=debug")
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url =
            get("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let provisioning = remote_endpoint(
            &get,
            "PROVISIONING_API_URL",
            "PROVISIONING_API_TOKEN",
        )?;
        let notify = remote_endpoint(&get, "NOTIFY_API_URL", "NOTIFY_API_TOKEN")?;

        let auth = match get("AUTH_API_URL") {
            Some(base_url) => {
                validate_url("AUTH_API_URL", &base_url)?;
                let credential = match (get("AUTH_SERVICE_KEY"), get("AUTH_REFRESH_TOKEN")) {
                    (Some(key), _) => AuthCredential::ServiceKey(key),
                    (None, Some(token)) => AuthCredential::RefreshToken(token),
                    (None, None) => {
                        return Err(ConfigError::MissingVar("AUTH_SERVICE_KEY".to_string()))
                    }
                };
                Some(AuthEndpoint {
                    base_url,
                    credential,
                })
            }
            None => None,
        };

        let timeout_secs: u64 = parse_or(&get, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(invalid("HTTP_TIMEOUT_SECS", "must be at least 1"));
        }

        let sentinel_email =
            get("SENTINEL_ADMIN_EMAIL").unwrap_or_else(|| DEFAULT_SENTINEL_EMAIL.to_string());
        if !sentinel_email.contains('@') {
            return Err(invalid("SENTINEL_ADMIN_EMAIL", "must be an email address"));
        }

        let recent_limit: usize = parse_or(&get, "RECONCILE_LIMIT", DEFAULT_RECENT_LIMIT)?;
        if recent_limit == 0 || recent_limit > MAX_RECONCILE_LIMIT {
            return Err(invalid(
                "RECONCILE_LIMIT",
                &format!("must be between 1 and {MAX_RECONCILE_LIMIT}"),
            ));
        }

        let stale_hours: i64 = parse_or(&get, "STALE_PENDING_HOURS", DEFAULT_STALE_PENDING_HOURS)?;
        if stale_hours <= 0 {
            return Err(invalid("STALE_PENDING_HOURS", "must be positive"));
        }

        let login_url =
            get("LOGIN_URL").unwrap_or_else(|| "http://localhost:3000/login".to_string());
        validate_url("LOGIN_URL", &login_url)?;

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("PORT") {
            Some(port) => port.parse::<u16>()?,
            None => 8080,
        };

        let rust_log = get("RUST_LOG").unwrap_or_else(|| "info,mise=debug".to_string());

        Ok(Self {
            database_url,
            provisioning,
            auth,
            notify,
            http_timeout: Duration::from_secs(timeout_secs),
            reconciliation: ReconciliationConfig {
                sentinel_email,
                recent_limit,
                stale_pending_after: chrono::Duration::hours(stale_hours),
            },
            login_url,
            host,
            port,
            rust_log,
        })
    }

    /// `host:port` to bind the admin server to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn remote_endpoint<G>(get: &G, url_var: &str, token_var: &str) -> Result<Option<RemoteEndpoint>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(base_url) = get(url_var) else {
        return Ok(None);
    };
    validate_url(url_var, &base_url)?;
    let token = get(token_var).ok_or_else(|| ConfigError::MissingVar(token_var.to_string()))?;
    Ok(Some(RemoteEndpoint { base_url, token }))
}

fn parse_or<G, T>(get: &G, var: &str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(var) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| invalid(var, &e.to_string())),
        None => Ok(default),
    }
}

fn validate_url(var: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(invalid(var, "must start with http:// or https://"))
    }
}

fn invalid(var: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.to_string(),
        message: message.to_string(),
    }
}
