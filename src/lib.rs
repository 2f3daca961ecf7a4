// src/lib.rs
//! Agent Fabric
//!
//! Distributed agent runtime: agents defined in one process can be invoked
//! transparently from another, with calls dispatched asynchronously and
//! results retrieved later through a shared, expiring result pool.
//!
//! # Architecture
//!
//! The crate is structured into several key modules:
//!
//! - **pool**: Result pool with blocking reads (in-process and store-backed)
//! - **registry**: Class-name to constructor mapping, extensible at runtime
//! - **agents**: The `Agent` trait plus builtin and scripted agents
//! - **host**: Instance table, per-identity mailboxes, bounded execution
//! - **proxy**: Location-transparent stand-in for a remote agent
//! - **rpc**: gRPC wire surface
//! - **launcher**: Host lifecycle (bind, serve, shutdown)
//! - **observability**: Tracing and metrics initialization
//! - **utils**: Errors and configuration
//!
//! ```text
//! caller ──> AgentProxy.invoke ──> gRPC / in-process
//!                                      │
//!                             AgentHost.dispatch ──> mailbox ──> agent
//!                                      │                           │
//!                                   Ticket                 pool.set(outcome)
//!                                      │                           │
//! caller <── PendingCall.wait <── pool.get(ticket) <───────────────┘
//! ```

// Public module exports
pub mod agents;
pub mod host;
pub mod launcher;
pub mod observability;
pub mod pool;
pub mod proxy;
pub mod registry;
pub mod rpc;
pub mod utils;

// Re-export commonly used types
pub use agents::{Agent, AgentRef, EchoAgent, ScriptedAgent};
pub use host::{AgentHost, HostStats};
pub use launcher::Launcher;
pub use pool::{CallOutcome, LocalResultPool, PoolOptions, ResultPool, StoreResultPool, Ticket};
pub use proxy::{AgentProxy, AgentSpec, PendingCall, Transport};
pub use registry::AgentRegistry;
pub use utils::config::FabricConfig;
pub use utils::errors::{FabricError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
