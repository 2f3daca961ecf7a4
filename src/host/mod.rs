// src/host/mod.rs
//! Agent host
//!
//! Owns live agent instances and answers two request kinds: *create* and
//! *invoke*. Each instance gets a mailbox task that delivers invocations
//! strictly in arrival order, so a logical agent processes one call at a
//! time; a host-wide semaphore bounds how many invocations execute
//! concurrently across all instances, independently of how many are
//! hosted.
//!
//! # Architecture
//!
//! ```text
//! dispatch(id, method, args)
//!     │ prepare() ──> Ticket (returned immediately)
//!     ▼
//! mailbox (FIFO per identity, bounded)
//!     ▼
//! mailbox task ── acquire permit ──> agent.invoke()
//!     ▼
//! pool.set(ticket, outcome)  ──> wakes  get(ticket)
//! ```
//!
//! Dispatched invocations run to completion; there is no cooperative
//! cancellation of an in-flight call.

use crate::agents::AgentRef;
use crate::pool::{CallOutcome, ResultPool, Ticket};
use crate::registry::AgentRegistry;
use crate::utils::config::HostConfig;
use crate::utils::errors::{FabricError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::FutureExt;
use metrics::{counter, gauge};
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use ulid::Ulid;

/// One queued method call, consumed once by the mailbox task
struct Invocation {
    method: String,
    args: Value,
    ticket: Ticket,
}

/// Bookkeeping for one live instance
struct InstanceHandle {
    class_name: String,
    mailbox: mpsc::Sender<Invocation>,
    task: JoinHandle<()>,
}

/// Host statistics
#[derive(Debug, Clone)]
pub struct HostStats {
    pub live_agents: usize,
    pub max_agents: usize,
    pub inflight_invocations: usize,
    pub max_concurrent_invocations: usize,
}

/// Hosts live agent instances and executes invocations on their behalf
pub struct AgentHost {
    config: HostConfig,
    registry: Arc<AgentRegistry>,
    pool: Arc<dyn ResultPool>,
    instances: DashMap<String, InstanceHandle>,
    permits: Arc<Semaphore>,
    closed: AtomicBool,
}

impl AgentHost {
    pub fn new(config: HostConfig, registry: Arc<AgentRegistry>, pool: Arc<dyn ResultPool>) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_invocations));
        info!(
            "Agent host ready: {} instance slots, {} concurrent invocations",
            config.max_agents, config.max_concurrent_invocations
        );

        Self {
            config,
            registry,
            pool,
            instances: DashMap::new(),
            permits,
            closed: AtomicBool::new(false),
        }
    }

    /// The pool this host publishes results into
    pub fn pool(&self) -> &Arc<dyn ResultPool> {
        &self.pool
    }

    /// The registry this host constructs instances from
    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Instantiate a class under `agent_id` (generated when `None`)
    ///
    /// An inline script registers the class first, so later creates can
    /// reuse it by name alone.
    pub async fn create_agent(
        &self,
        agent_id: Option<String>,
        class_name: &str,
        args: Value,
        inline_script: Option<&str>,
    ) -> Result<String> {
        if self.closed.load(Ordering::Acquire) {
            return Err(FabricError::HostFull("host is shutting down".into()));
        }
        if self.instances.len() >= self.config.max_agents {
            return Err(FabricError::HostFull(format!(
                "instance table full ({} agents)",
                self.config.max_agents
            )));
        }

        if let Some(script) = inline_script {
            self.registry.register_script(class_name, script)?;
        }
        let factory = self.registry.resolve(class_name)?;

        let id = agent_id.unwrap_or_else(|| Ulid::new().to_string());
        if self.instances.contains_key(&id) {
            return Err(FabricError::AgentExists(id));
        }

        let agent = factory(args)?;

        match self.instances.entry(id.clone()) {
            Entry::Occupied(_) => Err(FabricError::AgentExists(id)),
            Entry::Vacant(slot) => {
                let (tx, rx) = mpsc::channel(self.config.mailbox_capacity);
                let task = tokio::spawn(run_mailbox(
                    id.clone(),
                    agent,
                    rx,
                    Arc::clone(&self.pool),
                    Arc::clone(&self.permits),
                ));
                slot.insert(InstanceHandle {
                    class_name: class_name.to_string(),
                    mailbox: tx,
                    task,
                });

                gauge!("fabric_agents_live").increment(1.0);
                debug!("Created agent {} of class {}", id, class_name);
                Ok(id)
            }
        }
    }

    /// Enqueue an invocation and return its ticket immediately
    ///
    /// The caller is never blocked by dispatch itself; only
    /// `pool().get(ticket)` blocks. A full mailbox is a synchronous
    /// capacity error.
    pub async fn dispatch(&self, agent_id: &str, method: &str, args: Value) -> Result<Ticket> {
        let mailbox = self
            .instances
            .get(agent_id)
            .map(|handle| handle.mailbox.clone())
            .ok_or_else(|| FabricError::AgentNotFound(agent_id.to_string()))?;

        let ticket = self.pool.prepare().await?;
        let invocation = Invocation {
            method: method.to_string(),
            args,
            ticket,
        };

        match mailbox.try_send(invocation) {
            Ok(()) => {
                debug!("Dispatched {}.{} as {}", agent_id, method, ticket);
                Ok(ticket)
            }
            Err(TrySendError::Full(_)) => Err(FabricError::HostFull(format!(
                "mailbox full for agent {}",
                agent_id
            ))),
            // The mailbox task is gone; the instance was removed between
            // lookup and send.
            Err(TrySendError::Closed(_)) => Err(FabricError::AgentNotFound(agent_id.to_string())),
        }
    }

    /// Dispatch and wait for the outcome; in-process testing convenience
    pub async fn dispatch_sync(
        &self,
        agent_id: &str,
        method: &str,
        args: Value,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let ticket = self.dispatch(agent_id, method, args).await?;
        self.pool.get(ticket, timeout).await?.into_result()
    }

    /// Class name of a live instance, if any
    pub fn class_of(&self, agent_id: &str) -> Option<String> {
        self.instances.get(agent_id).map(|h| h.class_name.clone())
    }

    /// Retire an instance: LIVE -> TERMINATED
    ///
    /// Already-queued invocations drain to completion first; new dispatches
    /// fail with not-found.
    pub async fn remove_agent(&self, agent_id: &str) -> Result<()> {
        let (id, handle) = self
            .instances
            .remove(agent_id)
            .ok_or_else(|| FabricError::AgentNotFound(agent_id.to_string()))?;

        gauge!("fabric_agents_live").decrement(1.0);
        let InstanceHandle { mailbox, task, .. } = handle;
        drop(mailbox);

        match tokio::time::timeout(Duration::from_secs(5), task).await {
            Ok(_) => debug!("Agent {} terminated", id),
            Err(_) => warn!("Agent {} did not drain in time", id),
        }
        Ok(())
    }

    /// Retire every instance
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);

        let ids: Vec<String> = self.instances.iter().map(|e| e.key().clone()).collect();
        for id in &ids {
            let _ = self.remove_agent(id).await;
        }
        info!("Agent host stopped ({} agents retired)", ids.len());
    }

    pub fn stats(&self) -> HostStats {
        HostStats {
            live_agents: self.instances.len(),
            max_agents: self.config.max_agents,
            inflight_invocations: self.config.max_concurrent_invocations
                - self.permits.available_permits(),
            max_concurrent_invocations: self.config.max_concurrent_invocations,
        }
    }
}

/// Per-instance delivery loop
///
/// Receives invocations in arrival order. Non-reentrant agents execute
/// inline, so the next call cannot start before the previous one finished;
/// reentrant agents fan out onto the runtime, still bounded by the
/// host-wide permit.
async fn run_mailbox(
    agent_id: String,
    agent: AgentRef,
    mut rx: mpsc::Receiver<Invocation>,
    pool: Arc<dyn ResultPool>,
    permits: Arc<Semaphore>,
) {
    debug!("Mailbox open for {}", agent_id);

    while let Some(invocation) = rx.recv().await {
        let permit = match Arc::clone(&permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        if agent.reentrant() {
            let agent = Arc::clone(&agent);
            let pool = Arc::clone(&pool);
            let agent_id = agent_id.clone();
            tokio::spawn(async move {
                execute(&agent_id, agent, invocation, &pool).await;
                drop(permit);
            });
        } else {
            execute(&agent_id, Arc::clone(&agent), invocation, &pool).await;
            drop(permit);
        }
    }

    debug!("Mailbox closed for {}", agent_id);
}

/// Run one invocation and publish its outcome
///
/// Method errors and panics become error-flagged outcomes; they never tear
/// down the mailbox task.
async fn execute(agent_id: &str, agent: AgentRef, invocation: Invocation, pool: &Arc<dyn ResultPool>) {
    let Invocation { method, args, ticket } = invocation;
    counter!("fabric_invocations_total").increment(1);

    let result = AssertUnwindSafe(agent.invoke(&method, args)).catch_unwind().await;

    let outcome = match result {
        Ok(Ok(value)) => CallOutcome::Value(value),
        Ok(Err(e)) => {
            counter!("fabric_invocation_errors_total").increment(1);
            // Keep the original text; the caller re-raises it verbatim.
            let text = match e {
                FabricError::Invocation(text) => text,
                other => other.to_string(),
            };
            CallOutcome::Error(text)
        }
        Err(panic) => {
            counter!("fabric_invocation_errors_total").increment(1);
            let text = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("{}.{} panicked: {}", agent_id, method, text);
            CallOutcome::Error(format!("invocation panicked: {}", text))
        }
    };

    if let Err(e) = pool.set(ticket, outcome).await {
        warn!("Could not publish {} for {}: {}", ticket, agent_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Agent;
    use crate::pool::{LocalResultPool, PoolOptions};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex as StdMutex;
    use std::time::Instant;

    fn test_host() -> AgentHost {
        host_with(HostConfig::default())
    }

    fn host_with(config: HostConfig) -> AgentHost {
        let registry = Arc::new(AgentRegistry::with_builtins());
        let pool = Arc::new(LocalResultPool::new(PoolOptions::default()));
        AgentHost::new(config, registry, pool)
    }

    /// Records invocation labels after an optional delay
    struct RecorderAgent {
        log: Arc<StdMutex<Vec<String>>>,
        reentrant: bool,
    }

    #[async_trait]
    impl Agent for RecorderAgent {
        fn class_name(&self) -> &str {
            "recorder"
        }

        fn reentrant(&self) -> bool {
            self.reentrant
        }

        async fn invoke(&self, method: &str, args: Value) -> Result<Value> {
            match method {
                "work" => {
                    let label = args[0].as_str().unwrap_or("?").to_string();
                    let delay_ms = args[1].as_u64().unwrap_or(0);
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    self.log.lock().unwrap().push(label.clone());
                    Ok(json!(label))
                }
                "explode" => panic!("recorder detonated"),
                other => Err(FabricError::Invocation(format!("unknown method: {}", other))),
            }
        }
    }

    fn register_recorder(host: &AgentHost, reentrant: bool) -> Arc<StdMutex<Vec<String>>> {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let factory_log = Arc::clone(&log);
        host.registry().register("recorder", move |_args| {
            Ok(RecorderAgent {
                log: Arc::clone(&factory_log),
                reentrant,
            })
        });
        log
    }

    #[tokio::test]
    async fn test_round_trip_echo() {
        let host = test_host();
        host.create_agent(Some("X".into()), "echo", json!([]), None)
            .await
            .unwrap();

        let ticket = host.dispatch("X", "echo", json!(["hi"])).await.unwrap();
        let outcome = host.pool().get(ticket, Some(Duration::from_secs(1))).await.unwrap();
        assert_eq!(outcome, CallOutcome::Value(json!("hi")));
    }

    #[tokio::test]
    async fn test_generated_agent_id() {
        let host = test_host();
        let id = host.create_agent(None, "echo", json!([]), None).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(host.class_of(&id).as_deref(), Some("echo"));
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let host = test_host();
        host.create_agent(Some("dup".into()), "echo", json!([]), None)
            .await
            .unwrap();
        let err = host
            .create_agent(Some("dup".into()), "echo", json!([]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FabricError::AgentExists(_)));
    }

    #[tokio::test]
    async fn test_unknown_class_rejected() {
        let host = test_host();
        let err = host
            .create_agent(None, "ghost", json!([]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FabricError::ClassNotFound(_)));
    }

    #[tokio::test]
    async fn test_instance_table_capacity() {
        let host = host_with(HostConfig {
            max_agents: 1,
            ..Default::default()
        });
        host.create_agent(Some("only".into()), "echo", json!([]), None)
            .await
            .unwrap();
        let err = host
            .create_agent(Some("extra".into()), "echo", json!([]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FabricError::HostFull(_)));
    }

    #[tokio::test]
    async fn test_unknown_identity_never_matches() {
        let host = test_host();
        host.create_agent(Some("real".into()), "echo", json!([]), None)
            .await
            .unwrap();

        let err = host.dispatch("not-real", "echo", json!([])).await.unwrap_err();
        assert!(matches!(err, FabricError::AgentNotFound(_)));
    }

    #[tokio::test]
    async fn test_same_identity_is_fifo() {
        let host = test_host();
        let log = register_recorder(&host, false);
        host.create_agent(Some("r".into()), "recorder", json!([]), None)
            .await
            .unwrap();

        // A is slow, B is instant; B must still be observed second.
        let ta = host.dispatch("r", "work", json!(["A", 80])).await.unwrap();
        let tb = host.dispatch("r", "work", json!(["B", 0])).await.unwrap();

        host.pool().get(ta, Some(Duration::from_secs(2))).await.unwrap();
        host.pool().get(tb, Some(Duration::from_secs(2))).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["A".to_string(), "B".to_string()]);
    }

    #[tokio::test]
    async fn test_different_identities_run_concurrently() {
        let host = test_host();
        register_recorder(&host, false);

        let mut tickets = Vec::new();
        for i in 0..10 {
            let id = format!("r{}", i);
            host.create_agent(Some(id.clone()), "recorder", json!([]), None)
                .await
                .unwrap();
            tickets.push(host.dispatch(&id, "work", json!([id, 200])).await.unwrap());
        }

        let started = Instant::now();
        for ticket in tickets {
            host.pool().get(ticket, Some(Duration::from_secs(5))).await.unwrap();
        }

        // Ten 200ms invocations across ten identities finish in roughly one
        // delay, not two seconds.
        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_millis(600), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_reentrant_agent_interleaves() {
        let host = test_host();
        register_recorder(&host, true);
        host.create_agent(Some("r".into()), "recorder", json!([]), None)
            .await
            .unwrap();

        let started = Instant::now();
        let t1 = host.dispatch("r", "work", json!(["a", 150])).await.unwrap();
        let t2 = host.dispatch("r", "work", json!(["b", 150])).await.unwrap();
        host.pool().get(t1, Some(Duration::from_secs(2))).await.unwrap();
        host.pool().get(t2, Some(Duration::from_secs(2))).await.unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_millis(280), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_method_error_text_is_preserved() {
        let host = test_host();
        host.create_agent(Some("e".into()), "echo", json!([]), None)
            .await
            .unwrap();

        let err = host
            .dispatch_sync("e", "no_such_method", json!([]), Some(Duration::from_secs(1)))
            .await
            .unwrap_err();
        match err {
            FabricError::Invocation(text) => assert!(text.contains("no_such_method")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_panic_becomes_error_outcome() {
        let host = test_host();
        register_recorder(&host, false);
        host.create_agent(Some("r".into()), "recorder", json!([]), None)
            .await
            .unwrap();

        let err = host
            .dispatch_sync("r", "explode", json!([]), Some(Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("recorder detonated"));

        // The mailbox survived the panic.
        let ticket = host.dispatch("r", "work", json!(["ok", 0])).await.unwrap();
        let outcome = host.pool().get(ticket, Some(Duration::from_secs(1))).await.unwrap();
        assert_eq!(outcome, CallOutcome::Value(json!("ok")));
    }

    #[tokio::test]
    async fn test_removed_agent_is_not_found() {
        let host = test_host();
        host.create_agent(Some("gone".into()), "echo", json!([]), None)
            .await
            .unwrap();
        host.remove_agent("gone").await.unwrap();

        let err = host.dispatch("gone", "echo", json!([])).await.unwrap_err();
        assert!(matches!(err, FabricError::AgentNotFound(_)));

        let err = host.remove_agent("gone").await.unwrap_err();
        assert!(matches!(err, FabricError::AgentNotFound(_)));
    }

    #[tokio::test]
    async fn test_queued_work_drains_before_removal() {
        let host = test_host();
        let log = register_recorder(&host, false);
        host.create_agent(Some("r".into()), "recorder", json!([]), None)
            .await
            .unwrap();

        let ticket = host.dispatch("r", "work", json!(["slow", 100])).await.unwrap();
        host.remove_agent("r").await.unwrap();

        // The in-flight invocation ran to completion and its result is
        // still retrievable.
        let outcome = host.pool().get(ticket, Some(Duration::from_secs(1))).await.unwrap();
        assert_eq!(outcome, CallOutcome::Value(json!("slow")));
        assert_eq!(*log.lock().unwrap(), vec!["slow".to_string()]);
    }

    #[tokio::test]
    async fn test_inline_script_class() {
        let host = test_host();
        let script = r#"
            fn init(args) { #{ greeting: args[0] } }
            fn greet(state, args) { state.greeting + ", " + args[0] }
        "#;

        host.create_agent(Some("g".into()), "greeter", json!(["hello"]), Some(script))
            .await
            .unwrap();

        let out = host
            .dispatch_sync("g", "greet", json!(["fabric"]), Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert_eq!(out, json!("hello, fabric"));

        // The shipped class is reusable by name afterwards.
        host.create_agent(Some("g2".into()), "greeter", json!(["hey"]), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stats_and_shutdown() {
        let host = test_host();
        host.create_agent(Some("a".into()), "echo", json!([]), None)
            .await
            .unwrap();
        host.create_agent(Some("b".into()), "echo", json!([]), None)
            .await
            .unwrap();

        let stats = host.stats();
        assert_eq!(stats.live_agents, 2);

        host.shutdown().await;
        assert_eq!(host.stats().live_agents, 0);

        let err = host.create_agent(None, "echo", json!([]), None).await.unwrap_err();
        assert!(matches!(err, FabricError::HostFull(_)));
    }
}
