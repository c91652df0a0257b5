//! Command-line definition and dispatch.

use clap::{Parser, Subcommand};

use crate::commands;
use crate::config::AdminConfig;
use crate::context::AdminContext;
use crate::error::CliResult;
use crate::logging::{init_logging, LogFormat};

/// mise-admin - tenant onboarding operations
#[derive(Debug, Parser)]
#[command(name = "mise-admin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact, env = "MISE_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Print command results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Allocate a free slug for a business name
    AllocateSlug(commands::slugs::AllocateSlugArgs),

    /// Check whether a normalized slug is free
    CheckSlug(commands::slugs::CheckSlugArgs),

    /// Submit an onboarding payload to the provisioning service
    Provision(commands::provision::ProvisionArgs),

    /// Run the reconciliation sweep
    Reconcile(commands::reconcile::ReconcileArgs),

    /// Mark a stuck pending provisioning record as failed
    FailPending(commands::provision::FailPendingArgs),

    /// Email temporary credentials to a tenant owner
    SendCredentials(commands::credentials::SendCredentialsArgs),

    /// Write and revert a marker on the tenant owner's profile
    ProbeCredentials(commands::credentials::ProbeCredentialsArgs),

    /// Run the admin HTTP API
    Serve(commands::serve::ServeArgs),

    /// Apply pending database migrations
    Migrate(commands::migrate::MigrateArgs),
}

/// Load configuration, connect, and run one command.
pub async fn run(cli: Cli) -> CliResult<()> {
    let config = AdminConfig::from_env()?;
    if let Err(e) = init_logging(&config.rust_log, cli.log_format) {
        eprintln!("Warning: {e}");
    }

    let ctx = AdminContext::connect(config).await?;
    let json = cli.json;

    match cli.command {
        Commands::AllocateSlug(args) => commands::slugs::allocate(args, &ctx, json).await,
        Commands::CheckSlug(args) => commands::slugs::check(args, &ctx, json).await,
        Commands::Provision(args) => commands::provision::execute(args, &ctx, json).await,
        Commands::Reconcile(args) => commands::reconcile::execute(args, &ctx, json).await,
        Commands::FailPending(args) => commands::provision::fail_pending(args, &ctx, json).await,
        Commands::SendCredentials(args) => commands::credentials::send(args, &ctx, json).await,
        Commands::ProbeCredentials(args) => commands::credentials::probe(args, &ctx, json).await,
        Commands::Serve(args) => commands::serve::execute(args, &ctx).await,
        Commands::Migrate(args) => commands::migrate::execute(args, &ctx).await,
    }
}
