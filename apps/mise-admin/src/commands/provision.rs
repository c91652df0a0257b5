//! Provisioning commands - submit a payload file, fail a stuck record

use std::path::PathBuf;

use clap::Args;
use mise_api_tenants::models::{FailRecordRequest, ProvisioningRecordView};
use mise_clients::OnboardingPayload;
use mise_core::ProvisioningRecordId;
use uuid::Uuid;

use crate::context::AdminContext;
use crate::error::{CliError, CliResult};
use crate::output::{print_json, print_key_value, print_success};

/// Arguments for the provision command
#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Path to a JSON onboarding payload
    #[arg(long, short)]
    pub file: PathBuf,
}

/// Arguments for the fail-pending command
#[derive(Debug, Args)]
pub struct FailPendingArgs {
    /// Provisioning record ID
    pub record_id: Uuid,

    /// Why the record is being failed
    #[arg(long)]
    pub reason: String,
}

/// Read and parse an onboarding payload file.
pub async fn read_payload(path: &PathBuf) -> CliResult<OnboardingPayload> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| CliError::Validation(format!("{}: {e}", path.display())))
}

/// Execute the provision command
pub async fn execute(args: ProvisionArgs, ctx: &AdminContext, json: bool) -> CliResult<()> {
    let payload = read_payload(&args.file).await?;
    let outcome = ctx.provisioning_service()?.submit(&payload).await?;

    if json {
        print_json(&outcome)
    } else {
        print_success(&format!("Tenant '{}' provisioned", outcome.slug));
        print_key_value("Tenant ID", &outcome.tenant_id.to_string());
        Ok(())
    }
}

/// Execute the fail-pending command
pub async fn fail_pending(args: FailPendingArgs, ctx: &AdminContext, json: bool) -> CliResult<()> {
    let request = FailRecordRequest {
        reason: args.reason,
    };
    if let Some(error) = request.validate() {
        return Err(CliError::Validation(error));
    }

    let record = ctx
        .reconciliation_service()
        .fail_stuck_pending(ProvisioningRecordId::from_uuid(args.record_id), &request.reason)
        .await?;

    if json {
        print_json(&ProvisioningRecordView::from(&record))
    } else {
        print_success(&format!("Record {} marked failed", record.id));
        print_key_value("Candidate slug", &record.candidate_slug);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_payload_missing_file() {
        let err = read_payload(&PathBuf::from("/nonexistent/payload.json"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CliError::Io(_)));
    }
}
