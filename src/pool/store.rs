// src/pool/store.rs
//! Store-backed result pool
//!
//! Used when dispatcher and caller do not share memory: outcomes live in an
//! external key-value store with no notification mechanism, so "blocking"
//! is bounded polling at a fixed short interval. The store enforces the
//! same eviction policy as the in-process pool (TTL first, then capacity,
//! oldest first).

use crate::pool::{CallOutcome, PoolOptions, PoolStats, ResultPool, Ticket};
use crate::utils::errors::{FabricError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Raw row storage behind [`StoreResultPool`]
///
/// Rows are keyed by raw ticket id. A row exists from `insert_pending`
/// until purged; `resolve` fills its payload exactly once.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Create a pending row
    async fn insert_pending(&self, ticket: u64) -> Result<()>;

    /// Fill a pending row's payload; first write wins
    async fn resolve(&self, ticket: u64, payload: &[u8]) -> Result<()>;

    /// Read a row: `None` while pending, the payload once resolved,
    /// [`FabricError::TicketExpired`] when the row is gone
    async fn fetch(&self, ticket: u64) -> Result<Option<Vec<u8>>>;

    /// Apply the eviction policy; returns how many rows were removed
    async fn purge(&self, max_entries: usize, ttl: Duration) -> Result<u64>;

    /// `(pending, resolved)` row counts
    async fn counts(&self) -> Result<(u64, u64)>;

    /// Highest ticket id present, 0 when empty; seeds the ticket counter so
    /// a pool reopening a shared store never reissues an id
    async fn max_ticket(&self) -> Result<u64>;
}

/// [`ResultPool`] over any [`ResultStore`], waiting by bounded polling
pub struct StoreResultPool<S: ResultStore> {
    store: S,
    opts: PoolOptions,
    poll_interval: Duration,
    next_ticket: AtomicU64,
    evicted: AtomicU64,
}

impl<S: ResultStore> StoreResultPool<S> {
    pub async fn new(store: S, opts: PoolOptions, poll_interval: Duration) -> Result<Self> {
        let seed = store.max_ticket().await? + 1;
        Ok(Self {
            store,
            opts,
            poll_interval,
            next_ticket: AtomicU64::new(seed),
            evicted: AtomicU64::new(0),
        })
    }

    async fn run_purge(&self) -> Result<()> {
        let removed = self.store.purge(self.opts.max_entries, self.opts.ttl).await?;
        if removed > 0 {
            self.evicted.fetch_add(removed, Ordering::Relaxed);
            trace!("Purged {} result rows", removed);
        }
        Ok(())
    }
}

#[async_trait]
impl<S: ResultStore> ResultPool for StoreResultPool<S> {
    async fn prepare(&self) -> Result<Ticket> {
        let id = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        self.store.insert_pending(id).await?;
        self.run_purge().await?;
        Ok(Ticket(id))
    }

    async fn set(&self, ticket: Ticket, outcome: CallOutcome) -> Result<()> {
        self.run_purge().await?;
        let payload = serde_json::to_vec(&outcome)?;
        match self.store.resolve(ticket.0, &payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("set() rejected for ticket {}: {}", ticket, e);
                Err(e)
            }
        }
    }

    async fn get(&self, ticket: Ticket, timeout: Option<Duration>) -> Result<CallOutcome> {
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            match self.store.fetch(ticket.0).await? {
                Some(payload) => {
                    let outcome: CallOutcome = serde_json::from_slice(&payload)?;
                    return Ok(outcome);
                }
                None => {
                    let nap = match deadline {
                        Some(d) => {
                            let now = Instant::now();
                            if now >= d {
                                return Err(FabricError::WaitTimeout);
                            }
                            self.poll_interval.min(d - now)
                        }
                        None => self.poll_interval,
                    };
                    tokio::time::sleep(nap).await;
                }
            }
        }
    }

    async fn stats(&self) -> PoolStats {
        let (pending, resolved) = self.store.counts().await.unwrap_or((0, 0));
        PoolStats {
            pending,
            resolved,
            evicted: self.evicted.load(Ordering::Relaxed),
            capacity: self.opts.max_entries,
        }
    }
}

struct MemRow {
    payload: Option<Vec<u8>>,
    created: Instant,
}

struct MemInner {
    rows: HashMap<u64, MemRow>,

    /// Insertion order; the front is always the oldest row
    order: VecDeque<u64>,
}

/// In-memory [`ResultStore`], for tests and same-process sharing
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemInner>,
}

impl Default for MemInner {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            order: VecDeque::new(),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn insert_pending(&self, ticket: u64) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.rows.insert(
            ticket,
            MemRow {
                payload: None,
                created: Instant::now(),
            },
        );
        inner.order.push_back(ticket);
        Ok(())
    }

    async fn resolve(&self, ticket: u64, payload: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        match inner.rows.get_mut(&ticket) {
            None => Err(FabricError::TicketExpired(ticket)),
            Some(row) if row.payload.is_some() => Err(FabricError::TicketResolved(ticket)),
            Some(row) => {
                row.payload = Some(payload.to_vec());
                Ok(())
            }
        }
    }

    async fn fetch(&self, ticket: u64) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.lock();
        match inner.rows.get(&ticket) {
            None => Err(FabricError::TicketExpired(ticket)),
            Some(row) => Ok(row.payload.clone()),
        }
    }

    async fn purge(&self, max_entries: usize, ttl: Duration) -> Result<u64> {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        let mut removed = 0;

        while let Some(&front) = inner.order.front() {
            let expired = match inner.rows.get(&front) {
                Some(row) => now.duration_since(row.created) >= ttl,
                None => true,
            };
            if !expired {
                break;
            }
            inner.order.pop_front();
            if inner.rows.remove(&front).is_some() {
                removed += 1;
            }
        }

        while inner.order.len() > max_entries {
            if let Some(front) = inner.order.pop_front() {
                if inner.rows.remove(&front).is_some() {
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }

    async fn counts(&self) -> Result<(u64, u64)> {
        let inner = self.inner.lock();
        let pending = inner.rows.values().filter(|r| r.payload.is_none()).count() as u64;
        let resolved = inner.rows.len() as u64 - pending;
        Ok((pending, resolved))
    }

    async fn max_ticket(&self) -> Result<u64> {
        let inner = self.inner.lock();
        Ok(inner.rows.keys().copied().max().unwrap_or(0))
    }
}
