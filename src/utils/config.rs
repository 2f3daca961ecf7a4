// src/utils/config.rs
//! Runtime configuration
//!
//! Layered loading: built-in defaults, then an optional `fabric.toml` in the
//! working directory, then `FABRIC__*` environment variables (double
//! underscore as section separator, e.g. `FABRIC__SERVER__PORT=7070`).

use crate::utils::errors::{FabricError, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration for a fabric host process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FabricConfig {
    /// gRPC listener settings
    pub server: ServerConfig,

    /// Agent host settings
    pub host: HostConfig,

    /// Result pool settings
    pub pool: PoolSettings,

    /// Prometheus exporter settings
    pub metrics: MetricsConfig,

    /// Agent classes registered at boot, before the listener starts
    pub boot_classes: Vec<BootClass>,
}

/// gRPC listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    /// 0 binds an ephemeral port (useful for tests)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

/// Agent host settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Maximum live agent instances
    pub max_agents: usize,

    /// Maximum invocations executing at the same time, across all agents
    pub max_concurrent_invocations: usize,

    /// Queued invocations per agent before dispatch reports capacity
    pub mailbox_capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_agents: 256,
            max_concurrent_invocations: 64,
            mailbox_capacity: 128,
        }
    }
}

/// Result pool backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolBackend {
    /// In-process map with native notification waits
    Local,

    /// SQLite-backed store, waits by bounded polling
    Sqlite,
}

/// Result pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub backend: PoolBackend,

    /// Capacity bound; oldest entries evicted first
    pub max_entries: usize,

    /// Entries older than this are evicted even if never read
    pub ttl_secs: u64,

    /// Polling interval for backends without notifications
    pub poll_interval_ms: u64,

    /// Database path for the sqlite backend
    pub sqlite_path: String,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            backend: PoolBackend::Local,
            max_entries: 4096,
            ttl_secs: 600,
            poll_interval_ms: 100,
            sqlite_path: "fabric-results.db".to_string(),
        }
    }
}

/// Prometheus exporter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9464,
        }
    }
}

/// A script class to register before the listener starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootClass {
    pub class_name: String,

    /// Path to a rhai script defining the class
    pub path: String,
}

impl FabricConfig {
    /// Load configuration from defaults, `fabric.toml`, and environment
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("fabric").required(false))
            .add_source(config::Environment::with_prefix("FABRIC").separator("__"))
            .build()
            .map_err(|e| FabricError::Config(e.to_string()))?;

        let cfg: FabricConfig = settings
            .try_deserialize()
            .map_err(|e| FabricError::Config(e.to_string()))?;

        Ok(cfg)
    }

    /// Validate ranges before anything is built from this config
    pub fn validate(&self) -> Result<()> {
        if self.host.max_agents == 0 {
            return Err(FabricError::Config("host.max_agents cannot be 0".into()));
        }
        if self.host.max_concurrent_invocations == 0 {
            return Err(FabricError::Config(
                "host.max_concurrent_invocations cannot be 0".into(),
            ));
        }
        if self.host.mailbox_capacity == 0 {
            return Err(FabricError::Config("host.mailbox_capacity cannot be 0".into()));
        }
        if self.pool.max_entries == 0 {
            return Err(FabricError::Config("pool.max_entries cannot be 0".into()));
        }
        if self.pool.ttl_secs == 0 {
            return Err(FabricError::Config("pool.ttl_secs cannot be 0".into()));
        }
        if self.pool.poll_interval_ms == 0 {
            return Err(FabricError::Config("pool.poll_interval_ms cannot be 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = FabricConfig::default();
        assert_eq!(cfg.server.port, 7070);
        assert_eq!(cfg.host.max_agents, 256);
        assert_eq!(cfg.pool.backend, PoolBackend::Local);
        assert!(cfg.boot_classes.is_empty());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_bounds() {
        let mut cfg = FabricConfig::default();
        cfg.host.max_agents = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = FabricConfig::default();
        cfg.pool.ttl_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_backend_deserializes_lowercase() {
        let cfg: PoolSettings =
            serde_json::from_str(r#"{"backend": "sqlite"}"#).unwrap();
        assert_eq!(cfg.backend, PoolBackend::Sqlite);
    }
}
