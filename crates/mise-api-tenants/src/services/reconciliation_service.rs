//! Reconciliation sweep.
//!
//! Compares the tenant registry, the provisioning ledger and the identity
//! links and reports what does not line up. The sweep never writes; every
//! defect it finds is left for an operator, and
//! [`ReconciliationService::fail_stuck_pending`] is the one operator action
//! offered here.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use mise_core::ProvisioningRecordId;
use mise_db::models::{ProvisioningRecord, ProvisioningStatus, Tenant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{TenantError, TenantResult};
use crate::models::provision::ProvisioningRecordView;
use crate::models::reconciliation::{
    BrokenIdentityLink, OrphanedTenant, RecentTenant, ReconciliationReport,
    ReconciliationSummary, StalePendingRecord, SweepRun, TenantView,
};
use crate::stores::OnboardingStores;

/// Sentinel placeholder email that must never be a real tenant contact.
pub const DEFAULT_SENTINEL_EMAIL: &str = "admin@example.com";

/// Default size of the "recent" sections.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Default age after which a pending record is reported as stale.
pub const DEFAULT_STALE_PENDING_HOURS: i64 = 24;

/// Tunables for the sweep.
#[derive(Debug, Clone)]
pub struct ReconciliationConfig {
    pub sentinel_email: String,
    pub recent_limit: usize,
    pub stale_pending_after: Duration,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            sentinel_email: DEFAULT_SENTINEL_EMAIL.to_string(),
            recent_limit: DEFAULT_RECENT_LIMIT,
            stale_pending_after: Duration::hours(DEFAULT_STALE_PENDING_HOURS),
        }
    }
}

/// Service producing [`ReconciliationReport`]s.
#[derive(Clone)]
pub struct ReconciliationService {
    stores: OnboardingStores,
    config: ReconciliationConfig,
}

impl ReconciliationService {
    pub fn new(stores: OnboardingStores, config: ReconciliationConfig) -> Self {
        Self { stores, config }
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    /// Run the sweep now.
    pub async fn run(&self) -> TenantResult<SweepRun> {
        let started_at = Utc::now();
        let report = self.report(started_at).await?;

        let summary = &report.summary;
        if report.has_defects() {
            warn!(
                orphaned_tenants = summary.orphaned_tenants,
                broken_identity_links = summary.broken_identity_links,
                admin_email_tenants = summary.admin_email_tenants,
                stale_pending_records = summary.stale_pending_records,
                "Reconciliation found integrity defects"
            );
        } else {
            info!(
                total_tenants = summary.total_tenants,
                total_provisioning_records = summary.total_provisioning_records,
                "Reconciliation clean"
            );
        }

        Ok(SweepRun { started_at, report })
    }

    /// Build the report as of `now`.
    ///
    /// `now` only decides which pending records have crossed the stale
    /// threshold. Rows carry stored values only, so two runs over unchanged
    /// data serialize identically unless a record crossed the threshold in
    /// between.
    pub async fn report(&self, now: DateTime<Utc>) -> TenantResult<ReconciliationReport> {
        let tenants = self.stores.tenants.list_tenants().await?;
        let records = self.stores.ledger.list_records().await?;

        // Records arrive newest first, so the first one seen per tenant is the latest.
        let mut latest_status: HashMap<Uuid, ProvisioningStatus> = HashMap::new();
        let mut completed: HashSet<Uuid> = HashSet::new();
        for record in &records {
            if let Some(tenant_id) = record.tenant_id {
                latest_status.entry(tenant_id).or_insert(record.status);
                if record.is_completed() {
                    completed.insert(tenant_id);
                }
            }
        }

        let admin_email_tenants: Vec<TenantView> = self
            .stores
            .tenants
            .find_tenants_by_email(&self.config.sentinel_email)
            .await?
            .iter()
            .map(TenantView::from)
            .collect();

        let recent_tenants: Vec<RecentTenant> = self
            .stores
            .tenants
            .list_recent_tenants(self.config.recent_limit)
            .await?
            .iter()
            .map(|tenant| RecentTenant {
                tenant: TenantView::from(tenant),
                latest_provisioning_status: latest_status.get(&tenant.id).copied(),
            })
            .collect();

        let recent_provisioning_records: Vec<ProvisioningRecordView> = self
            .stores
            .ledger
            .list_recent_records(self.config.recent_limit)
            .await?
            .iter()
            .map(ProvisioningRecordView::from)
            .collect();

        let orphaned_tenants: Vec<OrphanedTenant> = tenants
            .iter()
            .filter(|tenant| !completed.contains(&tenant.id))
            .map(|tenant| orphan(tenant, latest_status.get(&tenant.id).copied()))
            .collect();

        let tenant_emails: HashSet<String> =
            tenants.iter().map(|t| t.email.to_lowercase()).collect();
        let broken_identity_links: Vec<BrokenIdentityLink> = self
            .stores
            .links
            .list_unlinked_profiles()
            .await?
            .iter()
            .map(|profile| {
                let matches = tenant_emails.contains(&profile.email.to_lowercase());
                BrokenIdentityLink::new(profile, matches)
            })
            .collect();

        let stale_cutoff = now - self.config.stale_pending_after;
        let stale_pending_records: Vec<StalePendingRecord> = records
            .iter()
            .filter(|r| r.status == ProvisioningStatus::Pending && r.created_at <= stale_cutoff)
            .map(|r| StalePendingRecord {
                id: r.id,
                tenant_id: r.tenant_id,
                candidate_slug: r.candidate_slug.clone(),
                created_at: r.created_at,
            })
            .collect();

        let summary = ReconciliationSummary {
            admin_email_tenants: admin_email_tenants.len(),
            recent_tenants: recent_tenants.len(),
            recent_provisioning_records: recent_provisioning_records.len(),
            broken_identity_links: broken_identity_links.len(),
            orphaned_tenants: orphaned_tenants.len(),
            stale_pending_records: stale_pending_records.len(),
            total_tenants: tenants.len(),
            total_provisioning_records: records.len(),
            stale_pending_threshold_hours: self.config.stale_pending_after.num_hours(),
        };

        Ok(ReconciliationReport {
            admin_email_tenants,
            recent_tenants,
            recent_provisioning_records,
            broken_identity_links,
            orphaned_tenants,
            stale_pending_records,
            summary,
        })
    }

    /// Operator action: give up on a `pending` record.
    ///
    /// Records are never failed automatically; this is the only transition
    /// out of `pending` that this crate performs.
    pub async fn fail_stuck_pending(
        &self,
        record_id: ProvisioningRecordId,
        reason: &str,
    ) -> TenantResult<ProvisioningRecord> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(TenantError::validation_field("reason", "Reason is required"));
        }

        let record = self
            .stores
            .ledger
            .find_record(record_id)
            .await?
            .ok_or_else(|| TenantError::NotFound(format!("Provisioning record {record_id} not found")))?;

        if record.status != ProvisioningStatus::Pending {
            return Err(TenantError::Conflict(format!(
                "Provisioning record {record_id} is {}, not pending",
                record.status
            )));
        }

        let failed = self
            .stores
            .ledger
            .mark_failed(record_id, reason)
            .await?
            .ok_or_else(|| {
                TenantError::Conflict(format!(
                    "Provisioning record {record_id} changed status concurrently"
                ))
            })?;

        warn!(
            record_id = %record_id,
            slug = %failed.candidate_slug,
            reason = %reason,
            "Pending provisioning record marked failed by operator"
        );
        Ok(failed)
    }
}

fn orphan(tenant: &Tenant, latest_status: Option<ProvisioningStatus>) -> OrphanedTenant {
    OrphanedTenant {
        id: tenant.id,
        slug: tenant.slug.clone(),
        name: tenant.name.clone(),
        email: tenant.email.clone(),
        created_at: tenant.created_at,
        latest_status,
    }
}
