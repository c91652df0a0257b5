//! CLI command implementations

pub mod credentials;
pub mod migrate;
pub mod provision;
pub mod reconcile;
pub mod serve;
pub mod slugs;
