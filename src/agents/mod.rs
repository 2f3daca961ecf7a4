// src/agents/mod.rs
//! Hostable agents
//!
//! An [`Agent`] is anything the host can instantiate and invoke methods on.
//! Arguments and results are JSON values; how an agent interprets them is
//! its own business. Two implementations ship with the crate:
//!
//! - [`EchoAgent`]: trivial builtin used for health checks and round-trip
//!   tests.
//! - [`ScriptedAgent`]: behavior defined by a rhai script shipped at
//!   runtime, the escape hatch for classes the host process was not built
//!   with.

pub mod echo;
pub mod scripted;

pub use echo::EchoAgent;
pub use scripted::ScriptedAgent;

use crate::utils::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Shared handle to a live agent instance
pub type AgentRef = Arc<dyn Agent>;

/// The call surface the host expects of every agent
#[async_trait]
pub trait Agent: Send + Sync {
    /// Class this instance was constructed from
    fn class_name(&self) -> &str;

    /// Whether invocations against this instance may interleave
    ///
    /// The default models "one agent, one conversation": the host delivers
    /// calls to a non-reentrant instance strictly one at a time, in arrival
    /// order.
    fn reentrant(&self) -> bool {
        false
    }

    /// Execute one method call
    ///
    /// Errors are captured by the host and surfaced to the caller with
    /// their text preserved; they never tear down the instance.
    async fn invoke(&self, method: &str, args: serde_json::Value) -> Result<serde_json::Value>;
}
