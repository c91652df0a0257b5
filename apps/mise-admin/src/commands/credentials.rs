//! Credential commands - email owner credentials, run the reversible probe

use clap::Args;
use mise_api_tenants::models::{SendCredentialsRequest, StepOutcome};
use mise_api_tenants::TenantError;
use mise_core::TenantId;
use uuid::Uuid;

use crate::context::AdminContext;
use crate::error::{CliError, CliResult};
use crate::output::{print_json, print_key_value, print_success, print_warning};

/// Arguments for the send-credentials command
#[derive(Args)]
pub struct SendCredentialsArgs {
    /// Tenant ID
    pub tenant_id: Uuid,

    /// Owner's display name for the email greeting
    #[arg(long)]
    pub owner_name: String,

    /// Recipient (defaults to the tenant's contact email)
    #[arg(long)]
    pub owner_email: Option<String>,

    /// Use this temporary secret instead of generating one
    #[arg(long, env = "MISE_TEMPORARY_SECRET", hide_env_values = true)]
    pub temporary_secret: Option<String>,
}

impl std::fmt::Debug for SendCredentialsArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendCredentialsArgs")
            .field("tenant_id", &self.tenant_id)
            .field("owner_name", &self.owner_name)
            .field("owner_email", &self.owner_email)
            .field(
                "temporary_secret",
                &self.temporary_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Arguments for the probe-credentials command
#[derive(Debug, Args)]
pub struct ProbeCredentialsArgs {
    /// Tenant ID
    pub tenant_id: Uuid,
}

/// Execute the send-credentials command
pub async fn send(args: SendCredentialsArgs, ctx: &AdminContext, json: bool) -> CliResult<()> {
    let request = SendCredentialsRequest {
        owner_name: args.owner_name,
        owner_email: args.owner_email,
        temporary_secret: args.temporary_secret,
    };
    if let Some(error) = request.validate() {
        return Err(CliError::Validation(error));
    }

    let state = ctx.app_state()?;
    let tenant_id = TenantId::from_uuid(args.tenant_id);
    let tenant = state
        .stores
        .tenants
        .find_tenant(tenant_id)
        .await?
        .ok_or(TenantError::TenantNotFound(tenant_id))?;
    let owner_email = request
        .owner_email
        .clone()
        .unwrap_or_else(|| tenant.email.clone());

    let service = &state.credential_service;
    let dispatch = match &request.temporary_secret {
        Some(secret) => {
            service
                .issue(&tenant, &request.owner_name, &owner_email, secret)
                .await?
        }
        None => service.rotate(&tenant, &request.owner_name, &owner_email).await?,
    };

    if json {
        print_json(&dispatch)
    } else {
        print_success(&format!("Credentials sent to {}", dispatch.recipient));
        print_key_value("Message ID", &dispatch.message_id);
        Ok(())
    }
}

/// Execute the probe-credentials command
pub async fn probe(args: ProbeCredentialsArgs, ctx: &AdminContext, json: bool) -> CliResult<()> {
    let state = ctx.app_state()?;
    let report = state
        .credential_service
        .probe_reversible_update(TenantId::from_uuid(args.tenant_id))
        .await?;

    if json {
        print_json(&report)?;
    } else {
        for step in &report.steps {
            let line = match &step.detail {
                Some(detail) => format!("{}: {detail}", step.name),
                None => step.name.clone(),
            };
            match step.outcome {
                StepOutcome::Passed => print_success(&line),
                StepOutcome::Failed => print_warning(&line),
            }
        }
    }

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::Validation(
            "Probe write failed; the original value was restored".to_string(),
        ))
    }
}
