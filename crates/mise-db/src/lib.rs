//! PostgreSQL persistence for the mise onboarding core.
//!
//! Three tables back the core invariants:
//!
//! - `tenants` - the tenant registry ([`models::Tenant`])
//! - `auto_provisioning` - the provisioning ledger ([`models::ProvisioningRecord`])
//! - `profiles` - identity linkage ([`models::Profile`])
//!
//! Models expose static query methods taking a `&PgPool`. No method spans
//! more than one table; cross-table consistency is checked by the
//! reconciliation sweep in `mise-api-tenants`.

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use migrations::run_migrations;
pub use pool::DbPool;
