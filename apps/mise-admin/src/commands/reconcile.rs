//! Reconcile command - run the read-only consistency sweep

use clap::Args;
use mise_api_tenants::models::ReconciliationReport;

use crate::context::AdminContext;
use crate::error::{CliError, CliResult};
use crate::output::{print_header, print_json, print_key_value, print_success, print_warning};

/// Arguments for the reconcile command
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Exit 0 even when defects are found
    #[arg(long)]
    pub allow_defects: bool,
}

/// Number of defect rows in a report.
pub fn defect_count(report: &ReconciliationReport) -> usize {
    let summary = &report.summary;
    summary.admin_email_tenants
        + summary.broken_identity_links
        + summary.orphaned_tenants
        + summary.stale_pending_records
}

/// Execute the reconcile command
pub async fn execute(args: ReconcileArgs, ctx: &AdminContext, json: bool) -> CliResult<()> {
    let run = ctx.reconciliation_service().run().await?;

    if json {
        print_json(&run)?;
    } else {
        print_report(&run.report);
    }

    let defects = defect_count(&run.report);
    if defects > 0 && !args.allow_defects {
        return Err(CliError::DefectsFound(defects));
    }
    Ok(())
}

fn print_report(report: &ReconciliationReport) {
    let summary = &report.summary;
    print_header("Reconciliation");
    print_key_value("Tenants", &summary.total_tenants.to_string());
    print_key_value(
        "Provisioning records",
        &summary.total_provisioning_records.to_string(),
    );

    if !report.has_defects() {
        print_success("No integrity defects found");
        return;
    }

    for tenant in &report.admin_email_tenants {
        print_warning(&format!(
            "Tenant '{}' ({}) uses the placeholder email {}",
            tenant.slug, tenant.id, tenant.email
        ));
    }
    for orphan in &report.orphaned_tenants {
        let status = orphan
            .latest_status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "no ledger entry".to_string());
        print_warning(&format!(
            "Tenant '{}' ({}) has no completed provisioning record ({status})",
            orphan.slug, orphan.id
        ));
    }
    for link in &report.broken_identity_links {
        let owner = if link.matches_tenant_email {
            " [tenant contact]"
        } else {
            ""
        };
        print_warning(&format!(
            "Profile {} <{}> has no identity link{owner}",
            link.profile_id, link.email
        ));
    }
    for stale in &report.stale_pending_records {
        print_warning(&format!(
            "Record {} for '{}' pending since {}",
            stale.id,
            stale.candidate_slug,
            stale.created_at.to_rfc3339()
        ));
    }
}
