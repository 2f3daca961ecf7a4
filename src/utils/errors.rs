// src/utils/errors.rs
//! Error types for the fabric runtime
//!
//! One crate-wide error enum covering the full taxonomy: capacity,
//! not-found, construction, invocation, transport, timeout. Construction
//! and invocation failures travel through the result pool as error-flagged
//! outcomes; everything else is reported synchronously at the call site.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, FabricError>;

/// Errors produced by the fabric runtime
#[derive(Debug, Error)]
pub enum FabricError {
    /// Instance table or a mailbox is at capacity
    #[error("host at capacity: {0}")]
    HostFull(String),

    /// No live instance under this id
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    /// An instance already exists under this id
    #[error("agent already exists: {0}")]
    AgentExists(String),

    /// Class name is not registered and no inline definition was supplied
    #[error("class not registered: {0}")]
    ClassNotFound(String),

    /// Ticket was evicted before resolution, or never existed
    #[error("ticket expired or unknown: t-{0}")]
    TicketExpired(u64),

    /// Ticket already carries a value; first write wins
    #[error("ticket already resolved: t-{0}")]
    TicketResolved(u64),

    /// Caller's wait budget elapsed before the ticket resolved
    #[error("wait timed out")]
    WaitTimeout,

    /// Agent constructor failed
    #[error("constructor failed: {0}")]
    Construction(String),

    /// Agent method failed; carries the original error text
    #[error("invocation failed: {0}")]
    Invocation(String),

    /// Could not reach the remote host
    #[error("transport failure: {0}")]
    Transport(String),

    /// Result store backend failed
    #[error("storage failure: {0}")]
    Storage(String),

    /// Inline class script failed to compile or run
    #[error("script error: {0}")]
    Script(String),

    /// Configuration rejected at load or validation time
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Argument or result payload could not be (de)serialized
    #[error("serialization failure: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FabricError {
    fn from(e: serde_json::Error) -> Self {
        FabricError::Serialization(e.to_string())
    }
}

impl From<rusqlite::Error> for FabricError {
    fn from(e: rusqlite::Error) -> Self {
        FabricError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FabricError::AgentNotFound("room-1".to_string());
        assert_eq!(err.to_string(), "agent not found: room-1");

        let err = FabricError::TicketExpired(42);
        assert_eq!(err.to_string(), "ticket expired or unknown: t-42");
    }

    #[test]
    fn test_serde_error_conversion() {
        let bad = serde_json::from_str::<serde_json::Value>("{");
        let err: FabricError = bad.unwrap_err().into();
        assert!(matches!(err, FabricError::Serialization(_)));
    }
}
