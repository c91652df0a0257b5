//! mise-admin - operator CLI and admin HTTP server for tenant onboarding
//!
//! Every subcommand loads [`config::AdminConfig`] from the environment,
//! connects to Postgres, and drives one onboarding service. `serve` exposes
//! the same services over HTTP with an OpenAPI document at `/openapi.json`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod openapi;
pub mod output;

pub use cli::{run, Cli, Commands};
