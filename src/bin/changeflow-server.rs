// ABOUTME: Server binary for the configuration change-approval service
// ABOUTME: Loads configuration, opens the record store, reconciles, and serves the admin API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

//! # Changeflow Server Binary
//!
//! Starts the admin HTTP API that stages, approves, cancels, and reverts
//! changes to telemetry profiles.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use changeflow::{
    config::{DatabaseUrl, ServerConfig},
    database::{Database, RecordStore},
    logging,
    routes::{build_router, ServerContext, ADMIN_PREFIX},
};
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "changeflow-server")]
#[command(about = "Change-approval service for managed telemetry configuration")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (`memory`, `sqlite::memory:`, or `sqlite:<path>`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(url) = args.database_url.as_deref() {
        config.database_url = DatabaseUrl::parse_url(url).context("Invalid --database-url value")?;
    }

    logging::init_from_env()?;

    info!("Starting changeflow change-approval service");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url).await?;
    info!("Database initialized successfully: {}", database.backend_info());

    let records: Arc<dyn RecordStore> = Arc::new(database);
    let context = ServerContext::from_records(records, config.workflow.clone());
    context.reconcile().await?;

    let router = build_router(&context, Duration::from_secs(config.request_timeout_secs));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    display_available_endpoints(config.http_port);
    info!("Server listening on {addr}");

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}

fn display_available_endpoints(port: u16) {
    info!("=== Available API Endpoints ===");
    info!("   Health:              GET  http://0.0.0.0:{port}/health");
    for (label, prefix) in [
        ("Telemetry Profile", "/change"),
        ("Telemetry 2.0 Profile", "/telemetry/v2/change"),
    ] {
        info!("{label} changes:");
        info!("   Pending:           GET  http://0.0.0.0:{port}{ADMIN_PREFIX}{prefix}/changes");
        info!("   Approved:          GET  http://0.0.0.0:{port}{ADMIN_PREFIX}{prefix}/approved");
        info!("   Approve:           POST http://0.0.0.0:{port}{ADMIN_PREFIX}{prefix}/approve/{{changeId}}");
        info!("   Revert:            POST http://0.0.0.0:{port}{ADMIN_PREFIX}{prefix}/revert/{{approveId}}");
    }
    info!("=== End of Endpoint List ===");
}
