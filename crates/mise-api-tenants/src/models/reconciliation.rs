//! Reconciliation report DTOs.
//!
//! The report body carries no generation time, so two sweeps over unchanged
//! data serialize identically. The time lives on [`SweepRun`].

use chrono::{DateTime, Utc};
use mise_db::models::{Profile, ProvisioningStatus, Tenant, TenantStatus};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::provision::ProvisioningRecordView;

/// A tenant row as shown in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantView {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub email: String,
    #[schema(value_type = String, example = "active")]
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Tenant> for TenantView {
    fn from(tenant: &Tenant) -> Self {
        Self {
            id: tenant.id,
            slug: tenant.slug.clone(),
            name: tenant.name.clone(),
            email: tenant.email.clone(),
            status: tenant.status,
            created_at: tenant.created_at,
        }
    }
}

/// A recent tenant next to its latest provisioning status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentTenant {
    #[serde(flatten)]
    pub tenant: TenantView,
    #[schema(value_type = Option<String>, example = "completed")]
    pub latest_provisioning_status: Option<ProvisioningStatus>,
}

/// Profile without a backing identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrokenIdentityLink {
    pub profile_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    /// The email is also a tenant contact email, so this is likely an owner.
    pub matches_tenant_email: bool,
}

impl BrokenIdentityLink {
    pub fn new(profile: &Profile, matches_tenant_email: bool) -> Self {
        Self {
            profile_id: profile.id,
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            role: profile.role.clone(),
            matches_tenant_email,
        }
    }
}

/// Tenant lacking a completed provisioning record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedTenant {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    /// Status of the newest ledger entry for this tenant, if one exists.
    #[schema(value_type = Option<String>, example = "pending")]
    pub latest_status: Option<ProvisioningStatus>,
}

/// Pending record older than the stale threshold.
///
/// Carries only stored values; the age is derived by the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StalePendingRecord {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub candidate_slug: String,
    pub created_at: DateTime<Utc>,
}

/// Counts for each list plus registry totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationSummary {
    pub admin_email_tenants: usize,
    pub recent_tenants: usize,
    pub recent_provisioning_records: usize,
    pub broken_identity_links: usize,
    pub orphaned_tenants: usize,
    pub stale_pending_records: usize,
    pub total_tenants: usize,
    pub total_provisioning_records: usize,
    /// Age in hours after which a pending record counts as stale.
    pub stale_pending_threshold_hours: i64,
}

/// Read-only consistency report over tenants, ledger and identity links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub admin_email_tenants: Vec<TenantView>,
    pub recent_tenants: Vec<RecentTenant>,
    pub recent_provisioning_records: Vec<ProvisioningRecordView>,
    pub broken_identity_links: Vec<BrokenIdentityLink>,
    pub orphaned_tenants: Vec<OrphanedTenant>,
    pub stale_pending_records: Vec<StalePendingRecord>,
    pub summary: ReconciliationSummary,
}

impl ReconciliationReport {
    /// `true` if any integrity defect was found.
    pub fn has_defects(&self) -> bool {
        !self.admin_email_tenants.is_empty()
            || !self.broken_identity_links.is_empty()
            || !self.orphaned_tenants.is_empty()
            || !self.stale_pending_records.is_empty()
    }
}

/// One execution of the sweep.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepRun {
    pub started_at: DateTime<Utc>,
    pub report: ReconciliationReport,
}
