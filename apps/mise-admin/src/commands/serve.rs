//! Serve command - run the admin HTTP API

use std::net::SocketAddr;

use axum::{routing::get, Json, Router};
use clap::Args;
use mise_api_tenants::{admin_router, AdminAppState};
use serde_json::{json, Value};
use tokio::signal;
use tracing::info;

use crate::context::AdminContext;
use crate::error::{CliError, CliResult};
use crate::openapi::openapi_router;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Apply pending migrations before accepting requests
    #[arg(long)]
    pub migrate: bool,
}

/// Admin routes plus `/health` and `/openapi.json`.
pub fn build_app(state: AdminAppState) -> Router {
    admin_router(state)
        .route("/health", get(health))
        .merge(openapi_router())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Execute the serve command
pub async fn execute(args: ServeArgs, ctx: &AdminContext) -> CliResult<()> {
    if args.migrate {
        mise_db::run_migrations(&ctx.pool).await?;
    }

    let app = build_app(ctx.app_state()?);

    let bind = ctx.config.bind_address();
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| CliError::Server(format!("Invalid bind address '{bind}': {e}")))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CliError::Server(format!("Failed to bind to address {addr}: {e}")))?;
    info!(%addr, "Admin server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CliError::Server(e.to_string()))?;

    info!("Admin server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
