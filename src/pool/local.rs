// src/pool/local.rs
//! In-process result pool
//!
//! Expiring map with one `Notify` handle per pending ticket. Waits are
//! native notification waits, capped at one second per round so a waiter
//! re-observes eviction and shutdown promptly instead of sleeping forever
//! on a handle nobody will ever signal again.

use crate::pool::{CallOutcome, PoolOptions, PoolStats, ResultPool, Ticket};
use crate::utils::errors::{FabricError, Result};
use async_trait::async_trait;
use metrics::{counter, gauge};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tracing::{debug, trace, warn};

/// Upper bound for one notification wait round
const CHECK_INTERVAL: Duration = Duration::from_secs(1);

enum Slot {
    Pending { notify: Arc<Notify>, created: Instant },
    Resolved { outcome: CallOutcome, created: Instant },
}

impl Slot {
    fn created(&self) -> Instant {
        match self {
            Slot::Pending { created, .. } => *created,
            Slot::Resolved { created, .. } => *created,
        }
    }
}

struct Inner {
    entries: HashMap<u64, Slot>,

    /// Insertion order; the front is always the oldest entry
    order: VecDeque<u64>,
}

/// In-process [`ResultPool`] backed by an expiring map
pub struct LocalResultPool {
    opts: PoolOptions,
    next_ticket: AtomicU64,
    evicted: AtomicU64,
    inner: Mutex<Inner>,
}

impl LocalResultPool {
    pub fn new(opts: PoolOptions) -> Self {
        Self {
            opts,
            next_ticket: AtomicU64::new(1),
            evicted: AtomicU64::new(0),
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Drop TTL-expired entries, then enforce the capacity bound oldest
    /// first. TTL runs before capacity so a ticket at both limits counts as
    /// a TTL eviction.
    fn purge(&self, inner: &mut Inner) {
        let now = Instant::now();

        while let Some(&front) = inner.order.front() {
            let expired = match inner.entries.get(&front) {
                Some(slot) => now.duration_since(slot.created()) >= self.opts.ttl,
                None => true,
            };
            if !expired {
                break;
            }
            self.evict_front(inner);
        }

        while inner.order.len() > self.opts.max_entries {
            self.evict_front(inner);
        }
    }

    fn evict_front(&self, inner: &mut Inner) {
        if let Some(id) = inner.order.pop_front() {
            if let Some(slot) = inner.entries.remove(&id) {
                if let Slot::Pending { notify, .. } = slot {
                    // Wake waiters so they re-check and observe the eviction.
                    notify.notify_waiters();
                }
                self.evicted.fetch_add(1, Ordering::Relaxed);
                counter!("fabric_pool_evictions_total").increment(1);
                trace!("Evicted ticket t-{}", id);
            }
        }
    }
}

impl Default for LocalResultPool {
    fn default() -> Self {
        Self::new(PoolOptions::default())
    }
}

#[async_trait]
impl ResultPool for LocalResultPool {
    async fn prepare(&self) -> Result<Ticket> {
        let id = self.next_ticket.fetch_add(1, Ordering::Relaxed);

        let mut inner = self.inner.lock();
        inner.entries.insert(
            id,
            Slot::Pending {
                notify: Arc::new(Notify::new()),
                created: Instant::now(),
            },
        );
        inner.order.push_back(id);
        self.purge(&mut inner);
        gauge!("fabric_pool_entries").set(inner.entries.len() as f64);

        trace!("Prepared ticket t-{}", id);
        Ok(Ticket(id))
    }

    async fn set(&self, ticket: Ticket, outcome: CallOutcome) -> Result<()> {
        let mut inner = self.inner.lock();
        self.purge(&mut inner);

        match inner.entries.get_mut(&ticket.0) {
            None => {
                warn!("set() on unknown or evicted ticket {}", ticket);
                Err(FabricError::TicketExpired(ticket.0))
            }
            Some(slot @ Slot::Pending { .. }) => {
                let created = slot.created();
                let notify = match slot {
                    Slot::Pending { notify, .. } => notify.clone(),
                    Slot::Resolved { .. } => unreachable!(),
                };
                *slot = Slot::Resolved { outcome, created };
                notify.notify_waiters();
                debug!("Resolved ticket {}", ticket);
                Ok(())
            }
            Some(Slot::Resolved { .. }) => {
                warn!("set() on already-resolved ticket {}; first write wins", ticket);
                Err(FabricError::TicketResolved(ticket.0))
            }
        }
    }

    async fn get(&self, ticket: Ticket, timeout: Option<Duration>) -> Result<CallOutcome> {
        let deadline = timeout.map(|t| tokio::time::Instant::now() + t);

        loop {
            let notify = {
                let mut inner = self.inner.lock();
                self.purge(&mut inner);
                match inner.entries.get(&ticket.0) {
                    None => return Err(FabricError::TicketExpired(ticket.0)),
                    Some(Slot::Resolved { outcome, .. }) => return Ok(outcome.clone()),
                    Some(Slot::Pending { notify, .. }) => notify.clone(),
                }
            };

            // Register interest before re-checking, so a set() landing
            // between the check and the wait still wakes us.
            let notified = notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let inner = self.inner.lock();
                match inner.entries.get(&ticket.0) {
                    None => return Err(FabricError::TicketExpired(ticket.0)),
                    Some(Slot::Resolved { outcome, .. }) => return Ok(outcome.clone()),
                    Some(Slot::Pending { .. }) => {}
                }
            }

            let wait_cap = match deadline {
                Some(d) => {
                    let now = tokio::time::Instant::now();
                    if now >= d {
                        return Err(FabricError::WaitTimeout);
                    }
                    CHECK_INTERVAL.min(d - now)
                }
                None => CHECK_INTERVAL,
            };

            // Timeout here only ends the round; the loop re-checks state.
            let _ = tokio::time::timeout(wait_cap, &mut notified).await;
        }
    }

    async fn stats(&self) -> PoolStats {
        let inner = self.inner.lock();
        let pending = inner
            .entries
            .values()
            .filter(|s| matches!(s, Slot::Pending { .. }))
            .count() as u64;
        let resolved = inner.entries.len() as u64 - pending;

        PoolStats {
            pending,
            resolved,
            evicted: self.evicted.load(Ordering::Relaxed),
            capacity: self.opts.max_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pool_with(max_entries: usize, ttl: Duration) -> LocalResultPool {
        LocalResultPool::new(PoolOptions { max_entries, ttl })
    }

    #[tokio::test]
    async fn test_get_after_set_returns_immediately() {
        let pool = LocalResultPool::default();
        let ticket = pool.prepare().await.unwrap();
        pool.set(ticket, CallOutcome::Value(json!("hi"))).await.unwrap();

        let outcome = pool.get(ticket, Some(Duration::from_millis(10))).await.unwrap();
        assert_eq!(outcome, CallOutcome::Value(json!("hi")));

        // Re-readable: get does not consume the entry.
        let again = pool.get(ticket, None).await.unwrap();
        assert_eq!(again, CallOutcome::Value(json!("hi")));
    }

    #[tokio::test]
    async fn test_get_before_set_blocks_until_value() {
        let pool = Arc::new(LocalResultPool::default());
        let ticket = pool.prepare().await.unwrap();

        let setter = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                pool.set(ticket, CallOutcome::Value(json!(42))).await.unwrap();
            })
        };

        let outcome = pool.get(ticket, Some(Duration::from_secs(5))).await.unwrap();
        assert_eq!(outcome, CallOutcome::Value(json!(42)));
        setter.await.unwrap();
    }

    #[tokio::test]
    async fn test_second_set_is_rejected() {
        let pool = LocalResultPool::default();
        let ticket = pool.prepare().await.unwrap();

        pool.set(ticket, CallOutcome::Value(json!(1))).await.unwrap();
        let second = pool.set(ticket, CallOutcome::Value(json!(2))).await;
        assert!(matches!(second, Err(FabricError::TicketResolved(_))));

        // First write wins.
        let outcome = pool.get(ticket, None).await.unwrap();
        assert_eq!(outcome, CallOutcome::Value(json!(1)));
    }

    #[tokio::test]
    async fn test_set_on_unknown_ticket_fails() {
        let pool = LocalResultPool::default();
        let result = pool.set(Ticket(999), CallOutcome::Value(json!(0))).await;
        assert!(matches!(result, Err(FabricError::TicketExpired(999))));
    }

    #[tokio::test]
    async fn test_timeout_leaves_entry_intact() {
        let pool = Arc::new(LocalResultPool::default());
        let ticket = pool.prepare().await.unwrap();

        let impatient = pool.get(ticket, Some(Duration::from_millis(20))).await;
        assert!(matches!(impatient, Err(FabricError::WaitTimeout)));

        // A later, patient caller still gets the value.
        pool.set(ticket, CallOutcome::Value(json!("late"))).await.unwrap();
        let outcome = pool.get(ticket, None).await.unwrap();
        assert_eq!(outcome, CallOutcome::Value(json!("late")));
    }

    #[tokio::test]
    async fn test_capacity_eviction_oldest_first() {
        let pool = pool_with(2, Duration::from_secs(600));

        let t1 = pool.prepare().await.unwrap();
        let t2 = pool.prepare().await.unwrap();
        let t3 = pool.prepare().await.unwrap();

        // t1 was the oldest and fell out of the capacity bound.
        let gone = pool.get(t1, Some(Duration::from_millis(10))).await;
        assert!(matches!(gone, Err(FabricError::TicketExpired(_))));

        pool.set(t2, CallOutcome::Value(json!(2))).await.unwrap();
        pool.set(t3, CallOutcome::Value(json!(3))).await.unwrap();
        assert_eq!(pool.get(t2, None).await.unwrap(), CallOutcome::Value(json!(2)));
        assert_eq!(pool.get(t3, None).await.unwrap(), CallOutcome::Value(json!(3)));

        let stats = pool.stats().await;
        assert_eq!(stats.evicted, 1);
    }

    #[tokio::test]
    async fn test_ttl_eviction() {
        let pool = pool_with(100, Duration::from_millis(30));
        let ticket = pool.prepare().await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        let gone = pool.get(ticket, Some(Duration::from_millis(10))).await;
        assert!(matches!(gone, Err(FabricError::TicketExpired(_))));
    }

    #[tokio::test]
    async fn test_ttl_eviction_wakes_blocked_waiter() {
        let pool = Arc::new(pool_with(100, Duration::from_millis(50)));
        let ticket = pool.prepare().await.unwrap();

        // Something else must touch the pool for the purge to run; mimic a
        // busy host preparing more tickets.
        let churn = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move {
                for _ in 0..5 {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    pool.prepare().await.unwrap();
                }
            })
        };

        let waited = pool.get(ticket, Some(Duration::from_secs(5))).await;
        assert!(matches!(waited, Err(FabricError::TicketExpired(_))));
        churn.await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_waits_complete_in_max_not_sum() {
        let pool = Arc::new(LocalResultPool::default());
        let delay = Duration::from_millis(200);

        let mut tickets = Vec::new();
        for _ in 0..10 {
            let ticket = pool.prepare().await.unwrap();
            tickets.push(ticket);
            let pool = Arc::clone(&pool);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                pool.set(ticket, CallOutcome::Value(json!(ticket.0))).await.unwrap();
            });
        }

        let started = Instant::now();
        let mut waits = Vec::new();
        for ticket in tickets {
            let pool = Arc::clone(&pool);
            waits.push(tokio::spawn(async move {
                pool.get(ticket, Some(Duration::from_secs(5))).await.unwrap()
            }));
        }
        for wait in waits {
            wait.await.unwrap();
        }

        // 10 × 200ms resolved concurrently: the whole batch completes in
        // roughly one delay, nowhere near the 2s serial total.
        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_millis(600), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_stats() {
        let pool = LocalResultPool::default();
        let t1 = pool.prepare().await.unwrap();
        let _t2 = pool.prepare().await.unwrap();
        pool.set(t1, CallOutcome::Value(json!(null))).await.unwrap();

        let stats = pool.stats().await;
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.evicted, 0);
    }
}
