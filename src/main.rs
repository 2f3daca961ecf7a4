// src/main.rs
//! Agent Fabric host daemon
//!
//! Hosts agent instances and serves the fabric gRPC surface until stopped
//! by ctrl-c or a wire-level shutdown request.

use agent_fabric::observability::{init_metrics, init_tracing};
use agent_fabric::registry::AgentRegistry;
use agent_fabric::utils::config::FabricConfig;
use agent_fabric::Launcher;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize observability (tracing, metrics)
    init_tracing()?;

    info!("Starting Agent Fabric host v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = FabricConfig::load()?;
    config.validate()?;
    info!("Configuration loaded: {:?}", config);

    if config.metrics.enabled {
        init_metrics(config.metrics.port)?;
        info!("Metrics exporter on port {}", config.metrics.port);
    }

    // Builtin classes; the launcher adds the config's boot classes
    let registry = Arc::new(AgentRegistry::with_builtins());

    let launcher = Launcher::launch(config, registry).await?;
    info!("Listening on {}", launcher.local_addr());

    // Run until ctrl-c or a wire-level shutdown
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, cleaning up...");
        }
        _ = launcher.wait_until_terminate() => {
            info!("Terminated over the wire");
        }
    }

    launcher.shutdown().await;
    info!("Host stopped gracefully");
    Ok(())
}
