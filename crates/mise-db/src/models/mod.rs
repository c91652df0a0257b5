//! Table models with static query methods.

pub mod profile;
pub mod provisioning_record;
pub mod tenant;

pub use profile::Profile;
pub use provisioning_record::{ProvisioningRecord, ProvisioningStatus};
pub use tenant::{Tenant, TenantStatus};
