// src/pool/mod.rs
//! Asynchronous result pool
//!
//! Decouples "a call was dispatched" from "the caller consumed its result".
//! The host resolves tickets as workers finish; callers block on `get`
//! until the ticket resolves, their wait budget runs out, or the entry is
//! evicted.
//!
//! # Architecture
//!
//! ```text
//! dispatch ──> prepare() ──> Ticket ──────────────┐
//!                                                 │
//! worker ────> set(ticket, outcome)               │
//!                  │                              ▼
//!                  └── wakes ──> get(ticket) ──> caller
//! ```
//!
//! Two implementations share the [`ResultPool`] contract:
//!
//! - [`LocalResultPool`]: in-process map, one notification handle per
//!   pending ticket. Used when dispatcher and caller share memory.
//! - [`StoreResultPool`]: bounded polling over a [`ResultStore`] without a
//!   notification mechanism (e.g. SQLite shared between processes).
//!
//! Both honor a capacity bound (oldest entries evicted first) and a TTL
//! (entries older than the limit are evicted even if never read).

pub mod local;
pub mod sqlite;
pub mod store;

pub use local::LocalResultPool;
pub use sqlite::SqliteStore;
pub use store::{MemoryStore, ResultStore, StoreResultPool};

use crate::utils::config::PoolSettings;
use crate::utils::errors::{FabricError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Opaque handle to one pending or completed call result
///
/// Monotonically issued per pool instance; re-readable until evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticket(pub u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t-{}", self.0)
    }
}

impl From<u64> for Ticket {
    fn from(raw: u64) -> Self {
        Ticket(raw)
    }
}

/// Outcome of one invocation, as stored in the pool
///
/// The error branch carries the remote error text verbatim so the proxy can
/// re-raise it unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallOutcome {
    Value(serde_json::Value),
    Error(String),
}

impl CallOutcome {
    /// Collapse into the caller-visible result
    pub fn into_result(self) -> Result<serde_json::Value> {
        match self {
            CallOutcome::Value(v) => Ok(v),
            CallOutcome::Error(msg) => Err(FabricError::Invocation(msg)),
        }
    }
}

/// Eviction policy shared by both pool implementations
#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    /// Capacity bound; oldest entries evicted first
    pub max_entries: usize,

    /// Maximum entry age, counted from `prepare`
    pub ttl: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_entries: 4096,
            ttl: Duration::from_secs(600),
        }
    }
}

impl From<&PoolSettings> for PoolOptions {
    fn from(settings: &PoolSettings) -> Self {
        Self {
            max_entries: settings.max_entries,
            ttl: Duration::from_secs(settings.ttl_secs),
        }
    }
}

/// Pool statistics
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Tickets prepared but not yet resolved
    pub pending: u64,

    /// Resolved entries still held
    pub resolved: u64,

    /// Entries removed by TTL or capacity since creation
    pub evicted: u64,

    /// Configured capacity bound
    pub capacity: usize,
}

/// Key-value store of call outcomes with blocking-read semantics
///
/// Contract highlights:
///
/// - `prepare` never blocks and is safe under concurrent callers.
/// - `set` resolves a ticket exactly once; a second `set` is rejected with
///   [`FabricError::TicketResolved`] (first write wins), `set` on an
///   unknown or evicted ticket with [`FabricError::TicketExpired`].
/// - `get` returns immediately once resolved, else blocks until resolution,
///   eviction ([`FabricError::TicketExpired`]) or the caller's timeout
///   ([`FabricError::WaitTimeout`]; the entry is untouched, so a later
///   patient caller may still retrieve the value).
#[async_trait]
pub trait ResultPool: Send + Sync {
    /// Allocate a fresh ticket in pending state
    async fn prepare(&self) -> Result<Ticket>;

    /// Resolve a pending ticket and wake its waiters
    async fn set(&self, ticket: Ticket, outcome: CallOutcome) -> Result<()>;

    /// Retrieve a ticket's outcome, waiting for resolution if necessary
    async fn get(&self, ticket: Ticket, timeout: Option<Duration>) -> Result<CallOutcome>;

    /// Current pool statistics
    async fn stats(&self) -> PoolStats;
}
