//! Migrate command - apply pending database migrations

use clap::Args;

use crate::context::AdminContext;
use crate::error::CliResult;
use crate::output::print_success;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {}

/// Execute the migrate command
pub async fn execute(_args: MigrateArgs, ctx: &AdminContext) -> CliResult<()> {
    mise_db::run_migrations(&ctx.pool).await?;
    print_success("Migrations applied");
    Ok(())
}
