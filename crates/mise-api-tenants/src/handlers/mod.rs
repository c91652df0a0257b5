//! HTTP handlers for the onboarding admin API.

pub mod credentials;
pub mod provision;
pub mod reconciliation;
pub mod slugs;

pub use credentials::{probe_credentials_handler, send_credentials_handler};
pub use provision::provision_handler;
pub use reconciliation::{fail_pending_record_handler, reconciliation_handler};
pub use slugs::{allocate_slug_handler, slug_availability_handler};
