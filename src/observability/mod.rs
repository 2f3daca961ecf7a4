// src/observability/mod.rs
//! Tracing and metrics initialization
//!
//! Called once from `main` before anything else starts. Tracing output is
//! controlled by `RUST_LOG` (`info` when unset); `FABRIC_LOG_JSON=1`
//! switches to JSON lines for log shippers. Metrics are exported in
//! Prometheus format on the configured port.

use crate::utils::errors::{FabricError, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("FABRIC_LOG_JSON").map(|v| v == "1").unwrap_or(false);

    let result = if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    result.map_err(|e| FabricError::Config(format!("tracing init failed: {}", e)))
}

/// Install the Prometheus metrics exporter
///
/// Must run inside a tokio runtime; the exporter serves HTTP on
/// `0.0.0.0:port`.
pub fn init_metrics(port: u16) -> Result<()> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| FabricError::Config(format!("metrics exporter failed: {}", e)))?;

    Ok(())
}
