//! `vllmd` daemon entry point.
//!
//! Wiring only: env + CLI configuration, tracing, bootstrap, serve loop.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vllmd_axum::{bootstrap, create_router};
use vllmd_core::Settings;
use vllmd_runtime::schedule_auto_launch;

/// Control-plane daemon for a single vLLM serving process.
#[derive(Debug, Parser)]
#[command(name = "vllmd", version, about)]
struct Cli {
    /// Address the controller binds; overrides the environment default.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port the controller binds; overrides VLLM_CONTROLLER_PORT.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is the normal case in containers
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    let port = cli.port.unwrap_or(settings.controller_port);

    let ctx = bootstrap(settings)?;
    schedule_auto_launch(ctx.supervisor.clone(), &ctx.settings);

    let app = create_router(ctx.clone());
    let addr = format!("{}:{port}", cli.host);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "vllmd controller listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Best effort: do not leave the serving process orphaned on exit
    match ctx.supervisor.terminate().await {
        Ok(outcome) => info!(?outcome, "serving process stopped during shutdown"),
        Err(vllmd_core::SupervisorError::NotRunning) => {}
        Err(e) => warn!(error = %e, "failed to stop serving process during shutdown"),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install ctrl-c handler");
    }
    info!("shutdown signal received");
}
