//! Wiring from [`AdminConfig`] to stores, remote clients and services.

use std::sync::Arc;

use mise_api_tenants::services::{
    AvailabilityService, ProvisioningService, ReconciliationService, SlugService,
};
use mise_api_tenants::{AdminAppState, OnboardingStores, RemoteServices};
use mise_clients::{
    build_http_client, AuthClient, NotificationClient, ProvisioningClient, RemoteHttp,
    ServiceCredentials, SessionAuth,
};
use mise_db::DbPool;
use tracing::{debug, info};

use crate::config::{AdminConfig, AuthCredential, ConfigError, RemoteEndpoint};
use crate::error::{CliError, CliResult};

/// Connected stores plus the configuration they were built from.
pub struct AdminContext {
    pub config: AdminConfig,
    pub pool: DbPool,
    pub stores: OnboardingStores,
}

impl AdminContext {
    /// Connect to the database and build the store handles.
    pub async fn connect(config: AdminConfig) -> CliResult<Self> {
        let pool = DbPool::connect(&config.database_url).await?;
        info!("Connected to database");
        let stores = OnboardingStores::postgres(&pool);
        Ok(Self {
            config,
            pool,
            stores,
        })
    }

    pub fn availability_service(&self) -> Arc<AvailabilityService> {
        Arc::new(AvailabilityService::new(
            self.stores.tenants.clone(),
            self.stores.ledger.clone(),
        ))
    }

    pub fn slug_service(&self) -> SlugService {
        SlugService::new(self.availability_service())
    }

    pub fn reconciliation_service(&self) -> ReconciliationService {
        ReconciliationService::new(self.stores.clone(), self.config.reconciliation.clone())
    }

    /// Provisioning service; needs only `PROVISIONING_API_URL`.
    pub fn provisioning_service(&self) -> CliResult<ProvisioningService> {
        let endpoint = required(&self.config.provisioning, "PROVISIONING_API_URL")?;
        let client = provisioning_client(endpoint, shared_http_client(&self.config)?);
        Ok(ProvisioningService::new(Arc::new(client)))
    }

    /// Full application state; needs every remote service configured.
    pub fn app_state(&self) -> CliResult<AdminAppState> {
        let remotes = build_remotes(&self.config)?;
        Ok(AdminAppState::new(
            self.stores.clone(),
            remotes,
            self.config.reconciliation.clone(),
            self.config.login_url.clone(),
        ))
    }
}

/// Build the three remote clients sharing one pooled HTTP client.
pub fn build_remotes(config: &AdminConfig) -> CliResult<RemoteServices> {
    let http_client = shared_http_client(config)?;

    let provisioning = required(&config.provisioning, "PROVISIONING_API_URL")?;
    let notify = required(&config.notify, "NOTIFY_API_URL")?;
    let auth = config
        .auth
        .as_ref()
        .ok_or_else(|| ConfigError::MissingVar("AUTH_API_URL".to_string()))?;

    let auth_credentials = match &auth.credential {
        AuthCredential::ServiceKey(key) => ServiceCredentials::Bearer { token: key.clone() },
        AuthCredential::RefreshToken(token) => ServiceCredentials::RefreshToken {
            token_endpoint: format!("{}/token", auth.base_url.trim_end_matches('/')),
            refresh_token: token.clone(),
        },
    };

    debug!(
        provisioning = %provisioning.base_url,
        auth = %auth.base_url,
        notify = %notify.base_url,
        "Building remote clients"
    );

    let provisioner = provisioning_client(provisioning, http_client.clone());
    let identities = AuthClient::new(RemoteHttp::new(
        auth.base_url.clone(),
        SessionAuth::new(auth_credentials, http_client.clone()),
        http_client.clone(),
    ));
    let notifier = NotificationClient::new(RemoteHttp::new(
        notify.base_url.clone(),
        SessionAuth::bearer(notify.token.clone(), http_client.clone()),
        http_client,
    ));

    Ok(RemoteServices {
        provisioner: Arc::new(provisioner),
        identities: Arc::new(identities),
        notifier: Arc::new(notifier),
    })
}

fn shared_http_client(config: &AdminConfig) -> CliResult<reqwest::Client> {
    build_http_client(config.http_timeout).map_err(|e| CliError::Server(e.to_string()))
}

fn provisioning_client(endpoint: &RemoteEndpoint, http_client: reqwest::Client) -> ProvisioningClient {
    ProvisioningClient::new(RemoteHttp::new(
        endpoint.base_url.clone(),
        SessionAuth::bearer(endpoint.token.clone(), http_client.clone()),
        http_client,
    ))
}

fn required<'a>(
    endpoint: &'a Option<RemoteEndpoint>,
    var: &str,
) -> Result<&'a RemoteEndpoint, ConfigError> {
    endpoint
        .as_ref()
        .ok_or_else(|| ConfigError::MissingVar(var.to_string()))
}
