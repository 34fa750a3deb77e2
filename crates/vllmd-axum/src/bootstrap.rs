//! Composition root for the web adapter.
//!
//! This is the only place where concrete implementations are wired together.

use std::sync::Arc;

use anyhow::{Context, Result};

use vllmd_core::{HubClient, Settings};
use vllmd_hf::{HfClientConfig, HfHubClient};
use vllmd_runtime::Supervisor;

/// All services the handlers need.
pub struct AppContext {
    pub supervisor: Arc<Supervisor>,
    pub hub: Arc<dyn HubClient>,
    pub settings: Settings,
}

/// Wire up the production context: real hub client, real supervisor.
pub fn bootstrap(settings: Settings) -> Result<Arc<AppContext>> {
    let hub: Arc<dyn HubClient> = Arc::new(
        HfHubClient::new(HfClientConfig::from_env()).context("failed to build hub client")?,
    );
    Ok(assemble(hub, None, settings))
}

/// Wire up a context with an injected hub and serving binary (tests, bespoke
/// deployments).
pub fn bootstrap_with(
    hub: Arc<dyn HubClient>,
    serve_program: impl Into<String>,
    settings: Settings,
) -> Arc<AppContext> {
    assemble(hub, Some(serve_program.into()), settings)
}

fn assemble(
    hub: Arc<dyn HubClient>,
    serve_program: Option<String>,
    settings: Settings,
) -> Arc<AppContext> {
    let supervisor = Arc::new(match serve_program {
        Some(program) => Supervisor::with_program(hub.clone(), program),
        None => Supervisor::new(hub.clone()),
    });
    Arc::new(AppContext {
        supervisor,
        hub,
        settings,
    })
}
