// src/launcher/mod.rs
//! Host lifecycle
//!
//! Builds a host from configuration, binds the listener eagerly (a failed
//! bind is returned to the caller instead of hanging a background task) and
//! serves the gRPC surface until told to stop. `shutdown` is idempotent;
//! the wire-level `Shutdown` rpc and a local `shutdown()` call take the
//! same path through a cancellation token.

use crate::host::AgentHost;
use crate::pool::{
    LocalResultPool, PoolOptions, ResultPool, SqliteStore, StoreResultPool,
};
use crate::registry::AgentRegistry;
use crate::rpc::pb::agent_fabric_server::AgentFabricServer;
use crate::rpc::{pb, FabricService};
use crate::utils::config::{FabricConfig, PoolBackend};
use crate::utils::errors::{FabricError, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// A running host and its listener
pub struct Launcher {
    addr: SocketAddr,
    host: Arc<AgentHost>,
    cancel: CancellationToken,
    serve_task: Mutex<Option<JoinHandle<()>>>,
}

impl Launcher {
    /// Build the pool and host from `config`, register boot classes, bind,
    /// and start serving
    pub async fn launch(config: FabricConfig, registry: Arc<AgentRegistry>) -> Result<Self> {
        config.validate()?;

        for boot in &config.boot_classes {
            let source = std::fs::read_to_string(&boot.path).map_err(|e| {
                FabricError::Config(format!("boot class {}: {}", boot.path, e))
            })?;
            registry.register_script(&boot.class_name, &source)?;
        }

        let pool = build_pool(&config).await?;
        let host = Arc::new(AgentHost::new(config.host.clone(), registry, pool));

        let bind_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| FabricError::Config(format!("invalid bind address: {}", e)))?;

        // Bind before spawning anything so the caller sees the failure.
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| FabricError::Transport(format!("bind {} failed: {}", bind_addr, e)))?;
        let addr = listener
            .local_addr()
            .map_err(|e| FabricError::Transport(e.to_string()))?;

        let cancel = CancellationToken::new();
        let service = FabricService::new(Arc::clone(&host), cancel.clone());

        let reflection = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(pb::FILE_DESCRIPTOR_SET)
            .build()
            .map_err(|e| FabricError::Config(format!("reflection init failed: {}", e)))?;

        let incoming = TcpListenerStream::new(listener);
        let signal = cancel.clone();
        let serving_host = Arc::clone(&host);
        let serve_task = tokio::spawn(async move {
            let served = tonic::transport::Server::builder()
                .add_service(reflection)
                .add_service(AgentFabricServer::new(service))
                .serve_with_incoming_shutdown(incoming, signal.cancelled())
                .await;

            if let Err(e) = served {
                error!("Server error: {}", e);
            }
            // Stopped accepting; drain whatever is still hosted.
            serving_host.shutdown().await;
        });

        info!("Fabric host listening on {}", addr);

        Ok(Self {
            addr,
            host,
            cancel,
            serve_task: Mutex::new(Some(serve_task)),
        })
    }

    /// Address the listener actually bound (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// The hosted agent host, for in-process callers and stats
    pub fn host(&self) -> &Arc<AgentHost> {
        &self.host
    }

    /// Block until the host is stopped, locally or over the wire
    pub async fn wait_until_terminate(&self) {
        self.cancel.cancelled().await;
    }

    /// Stop serving and drain the host; safe to call more than once
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        if let Some(task) = self.serve_task.lock().await.take() {
            match tokio::time::timeout(Duration::from_secs(10), task).await {
                Ok(Ok(())) => info!("Fabric host stopped"),
                Ok(Err(e)) => warn!("Serve task failed: {}", e),
                Err(_) => warn!("Serve task did not stop in time"),
            }
        }
    }
}

async fn build_pool(config: &FabricConfig) -> Result<Arc<dyn ResultPool>> {
    let opts = PoolOptions::from(&config.pool);
    match config.pool.backend {
        PoolBackend::Local => Ok(Arc::new(LocalResultPool::new(opts))),
        PoolBackend::Sqlite => {
            let store = SqliteStore::open(&config.pool.sqlite_path)?;
            let poll = Duration::from_millis(config.pool.poll_interval_ms);
            Ok(Arc::new(StoreResultPool::new(store, opts, poll).await?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::{AgentProxy, AgentSpec, Transport};
    use serde_json::json;

    fn test_config() -> FabricConfig {
        let mut config = FabricConfig::default();
        config.server.port = 0;
        config
    }

    async fn launch_test_host() -> Launcher {
        let registry = Arc::new(AgentRegistry::with_builtins());
        Launcher::launch(test_config(), registry).await.unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_over_grpc() {
        let launcher = launch_test_host().await;
        let addr = launcher.local_addr().to_string();

        let transport = Transport::connect(&addr).await.unwrap();
        let proxy = AgentProxy::create(transport, AgentSpec::new("echo").with_id("X"))
            .await
            .unwrap();

        let value = proxy
            .call("echo", json!(["hi"]), Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(value, json!("hi"));

        proxy.remove().await.unwrap();
        let err = proxy
            .call("echo", json!(["hi"]), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FabricError::AgentNotFound(_)));

        launcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_remote_not_found_maps_back() {
        let launcher = launch_test_host().await;
        let transport = Transport::connect(&launcher.local_addr().to_string())
            .await
            .unwrap();

        let proxy = AgentProxy::attach(transport.clone(), "nobody");
        let err = proxy
            .call("echo", json!([]), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FabricError::AgentNotFound(_)));

        let err = AgentProxy::create(transport, AgentSpec::new("no-class"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, FabricError::ClassNotFound(_)));

        launcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_inline_script_over_grpc() {
        let launcher = launch_test_host().await;
        let transport = Transport::connect(&launcher.local_addr().to_string())
            .await
            .unwrap();

        let script = r#"
            fn init(args) { #{ total: 0 } }
            fn add(state, args) {
                let next = state.total + args[0];
                #{ state: #{ total: next }, value: next }
            }
        "#;
        let proxy = AgentProxy::create(
            transport,
            AgentSpec::new("accumulator").with_script(script),
        )
        .await
        .unwrap();

        assert_eq!(
            proxy.call("add", json!([3]), Duration::from_secs(2)).await.unwrap(),
            json!(3)
        );
        assert_eq!(
            proxy.call("add", json!([4]), Duration::from_secs(2)).await.unwrap(),
            json!(7)
        );

        launcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_bind_failure_reports_to_caller() {
        let first = launch_test_host().await;

        let mut config = test_config();
        config.server.port = first.local_addr().port();
        let registry = Arc::new(AgentRegistry::with_builtins());

        let err = Launcher::launch(config, registry).await.err().unwrap();
        assert!(matches!(err, FabricError::Transport(_)));

        first.shutdown().await;
    }

    #[tokio::test]
    async fn test_wire_shutdown_terminates_launcher() {
        let launcher = launch_test_host().await;
        let transport = Transport::connect(&launcher.local_addr().to_string())
            .await
            .unwrap();

        transport.shutdown_host().await.unwrap();

        tokio::time::timeout(Duration::from_secs(2), launcher.wait_until_terminate())
            .await
            .expect("launcher did not observe the shutdown");

        // Idempotent local shutdown after the wire-level one.
        launcher.shutdown().await;
        launcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut config = test_config();
        config.host.max_agents = 0;
        let registry = Arc::new(AgentRegistry::with_builtins());

        let err = Launcher::launch(config, registry).await.err().unwrap();
        assert!(matches!(err, FabricError::Config(_)));
    }
}
