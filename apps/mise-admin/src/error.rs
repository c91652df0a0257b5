//! CLI error types and exit codes

use mise_api_tenants::TenantError;
use mise_core::Severity;
use mise_db::DbError;
use thiserror::Error;

use crate::config::ConfigError;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Configuration error
/// - 3: Reconciliation found integrity defects
/// - 4: A probe could not restore the data it changed
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tenant(#[from] TenantError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Reconciliation found {0} integrity defect(s)")]
    DefectsFound(usize),

    #[error("Server error: {0}")]
    Server(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            CliError::DefectsFound(_) => 3,
            CliError::Tenant(e) if e.severity() == Severity::Critical => 4,
            CliError::Tenant(_)
            | CliError::Database(_)
            | CliError::Validation(_)
            | CliError::Io(_)
            | CliError::Server(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => Some("Check the environment variables or your .env file."),
            CliError::DefectsFound(_) => {
                Some("Review the report; use 'mise-admin fail-pending' for stuck records.")
            }
            CliError::Tenant(TenantError::RevertFailed { .. }) => {
                Some("Restore the profile's full_name by hand before retrying the probe.")
            }
            CliError::Tenant(e) if e.is_recoverable() => Some("Try again in a few moments."),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Validation(format!("JSON error: {}", e))
    }
}
