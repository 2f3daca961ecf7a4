// src/proxy/mod.rs
//! Location-transparent agent proxy
//!
//! An [`AgentProxy`] stands in for an agent instance that may live in this
//! process or behind a remote host; callers cannot tell the difference.
//! Method calls serialize their arguments, travel over the [`Transport`],
//! and come back as a [`PendingCall`] holding the ticket. Because dispatch
//! returns before the work starts, a caller can issue calls against many
//! proxies and only then start consuming results; that pipelining is the
//! whole point of the result pool.
//!
//! Failure transparency: a proxy call ends in exactly one of four disjoint
//! ways: a value, the remote error with its original text, a timeout, or
//! a transport failure.

use crate::host::AgentHost;
use crate::pool::Ticket;
use crate::rpc::pb::agent_fabric_client::AgentFabricClient;
use crate::rpc::pb::{
    fetch_result_reply, ClassDefinition, CreateAgentRequest, FetchResultRequest, InvokeRequest,
    RegisterClassesRequest, RemoveAgentRequest, ShutdownRequest,
};
use crate::utils::errors::{FabricError, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::Channel;
use tonic::Code;
use tracing::debug;

/// How a proxy reaches its host: shared memory or a gRPC channel
#[derive(Clone)]
pub enum Transport {
    Local(Arc<AgentHost>),
    Remote(AgentFabricClient<Channel>),
}

impl Transport {
    /// In-process transport over a direct host reference
    pub fn local(host: Arc<AgentHost>) -> Self {
        Transport::Local(host)
    }

    /// Connect to a remote host at `host:port`
    pub async fn connect(addr: &str) -> Result<Self> {
        let endpoint = format!("http://{}", addr);
        let client = AgentFabricClient::connect(endpoint)
            .await
            .map_err(|e| FabricError::Transport(format!("connect {}: {}", addr, e)))?;
        Ok(Transport::Remote(client))
    }

    pub(crate) async fn create_agent(
        &self,
        agent_id: Option<String>,
        class_name: &str,
        args: &Value,
        inline_script: Option<&str>,
    ) -> Result<String> {
        match self {
            Transport::Local(host) => {
                host.create_agent(agent_id, class_name, args.clone(), inline_script)
                    .await
            }
            Transport::Remote(client) => {
                let mut client = client.clone();
                let request = CreateAgentRequest {
                    agent_id: agent_id.unwrap_or_default(),
                    class_name: class_name.to_string(),
                    args_json: serde_json::to_vec(args)?,
                    inline_script: inline_script.unwrap_or_default().to_string(),
                };
                let reply = client
                    .create_agent(request)
                    .await
                    .map_err(error_from_status)?;
                Ok(reply.into_inner().agent_id)
            }
        }
    }

    pub(crate) async fn invoke(&self, agent_id: &str, method: &str, args: &Value) -> Result<Ticket> {
        match self {
            Transport::Local(host) => host.dispatch(agent_id, method, args.clone()).await,
            Transport::Remote(client) => {
                let mut client = client.clone();
                let request = InvokeRequest {
                    agent_id: agent_id.to_string(),
                    method: method.to_string(),
                    args_json: serde_json::to_vec(args)?,
                };
                let reply = client.invoke(request).await.map_err(error_from_status)?;
                Ok(Ticket(reply.into_inner().ticket))
            }
        }
    }

    pub(crate) async fn fetch(&self, ticket: Ticket, timeout: Option<Duration>) -> Result<Value> {
        match self {
            Transport::Local(host) => host.pool().get(ticket, timeout).await?.into_result(),
            Transport::Remote(client) => {
                let mut client = client.clone();
                let request = FetchResultRequest {
                    ticket: ticket.0,
                    timeout_ms: timeout.map(|t| t.as_millis() as u64).unwrap_or(0),
                };
                let reply = client
                    .fetch_result(request)
                    .await
                    .map_err(error_from_status)?;

                match reply.into_inner().outcome {
                    Some(fetch_result_reply::Outcome::ValueJson(bytes)) => {
                        Ok(serde_json::from_slice(&bytes)?)
                    }
                    Some(fetch_result_reply::Outcome::Error(text)) => {
                        Err(FabricError::Invocation(text))
                    }
                    Some(fetch_result_reply::Outcome::Expired(_)) => {
                        Err(FabricError::TicketExpired(ticket.0))
                    }
                    Some(fetch_result_reply::Outcome::TimedOut(_)) => Err(FabricError::WaitTimeout),
                    None => Err(FabricError::Transport("empty fetch reply".into())),
                }
            }
        }
    }

    /// Bulk-register script classes ahead of any create call
    pub async fn register_classes(&self, classes: &[(String, String)]) -> Result<u32> {
        match self {
            Transport::Local(host) => {
                for (name, script) in classes {
                    host.registry().register_script(name, script)?;
                }
                Ok(classes.len() as u32)
            }
            Transport::Remote(client) => {
                let mut client = client.clone();
                let request = RegisterClassesRequest {
                    classes: classes
                        .iter()
                        .map(|(name, script)| ClassDefinition {
                            class_name: name.clone(),
                            script: script.clone(),
                        })
                        .collect(),
                };
                let reply = client
                    .register_classes(request)
                    .await
                    .map_err(error_from_status)?;
                Ok(reply.into_inner().registered)
            }
        }
    }

    /// Retire a remote instance
    pub async fn remove_agent(&self, agent_id: &str) -> Result<()> {
        match self {
            Transport::Local(host) => host.remove_agent(agent_id).await,
            Transport::Remote(client) => {
                let mut client = client.clone();
                client
                    .remove_agent(RemoveAgentRequest {
                        agent_id: agent_id.to_string(),
                    })
                    .await
                    .map_err(error_from_status)?;
                Ok(())
            }
        }
    }

    /// Ask the host process to stop
    pub async fn shutdown_host(&self) -> Result<()> {
        match self {
            Transport::Local(host) => {
                host.shutdown().await;
                Ok(())
            }
            Transport::Remote(client) => {
                let mut client = client.clone();
                client
                    .shutdown(ShutdownRequest {})
                    .await
                    .map_err(error_from_status)?;
                Ok(())
            }
        }
    }
}

/// Reconstruct a crate error from a gRPC status
///
/// NotFound covers three not-found flavors; the message prefix written by
/// our own Display impls disambiguates them.
fn error_from_status(status: tonic::Status) -> FabricError {
    let message = status.message().to_string();
    match status.code() {
        Code::ResourceExhausted => FabricError::HostFull(strip(&message, "host at capacity: ")),
        Code::AlreadyExists => FabricError::AgentExists(strip(&message, "agent already exists: ")),
        Code::NotFound => {
            if let Some(rest) = message.strip_prefix("class not registered: ") {
                FabricError::ClassNotFound(rest.to_string())
            } else {
                FabricError::AgentNotFound(strip(&message, "agent not found: "))
            }
        }
        Code::DeadlineExceeded => FabricError::WaitTimeout,
        Code::InvalidArgument => FabricError::Construction(message),
        Code::Internal => FabricError::Invocation(message),
        _ => FabricError::Transport(status.to_string()),
    }
}

fn strip(message: &str, prefix: &str) -> String {
    message
        .strip_prefix(prefix)
        .unwrap_or(message)
        .to_string()
}

/// What to create (or attach to) when building a proxy
#[derive(Debug, Clone)]
pub struct AgentSpec {
    pub agent_id: Option<String>,
    pub class_name: String,
    pub args: Value,
    pub inline_script: Option<String>,
}

impl AgentSpec {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            agent_id: None,
            class_name: class_name.into(),
            args: Value::Null,
            inline_script: None,
        }
    }

    pub fn with_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.inline_script = Some(script.into());
        self
    }
}

/// Local stand-in for a (possibly remote) agent instance
pub struct AgentProxy {
    transport: Transport,
    agent_id: String,
}

impl AgentProxy {
    /// Create the remote instance eagerly and wrap it
    ///
    /// Remote construction failures surface here, not at first call.
    pub async fn create(transport: Transport, spec: AgentSpec) -> Result<Self> {
        let agent_id = transport
            .create_agent(
                spec.agent_id,
                &spec.class_name,
                &spec.args,
                spec.inline_script.as_deref(),
            )
            .await?;

        debug!("Proxy bound to agent {}", agent_id);
        Ok(Self { transport, agent_id })
    }

    /// Wrap an instance that already exists on the host
    pub fn attach(transport: Transport, agent_id: impl Into<String>) -> Self {
        Self {
            transport,
            agent_id: agent_id.into(),
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Issue a call; returns once the host has queued it
    pub async fn invoke(&self, method: &str, args: Value) -> Result<PendingCall> {
        let ticket = self.transport.invoke(&self.agent_id, method, &args).await?;
        Ok(PendingCall {
            transport: self.transport.clone(),
            ticket,
        })
    }

    /// Issue a call and wait for its value
    pub async fn call(&self, method: &str, args: Value, timeout: Duration) -> Result<Value> {
        self.invoke(method, args).await?.wait(Some(timeout)).await
    }

    /// Retire the remote instance
    pub async fn remove(&self) -> Result<()> {
        self.transport.remove_agent(&self.agent_id).await
    }
}

/// Handle to one in-flight call
///
/// `wait` is re-invokable: a timed-out wait leaves the result retrievable
/// by a later, more patient wait.
pub struct PendingCall {
    transport: Transport,
    ticket: Ticket,
}

impl PendingCall {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Block until the call resolves, the pool evicts it, or `timeout`
    /// lapses
    pub async fn wait(&self, timeout: Option<Duration>) -> Result<Value> {
        self.transport.fetch(self.ticket, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Agent;
    use crate::pool::{LocalResultPool, PoolOptions};
    use crate::registry::AgentRegistry;
    use crate::utils::config::HostConfig;
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Instant;

    fn local_transport() -> (Transport, Arc<AgentHost>) {
        let registry = Arc::new(AgentRegistry::with_builtins());
        let pool = Arc::new(LocalResultPool::new(PoolOptions::default()));
        let host = Arc::new(AgentHost::new(HostConfig::default(), registry, pool));
        (Transport::local(Arc::clone(&host)), host)
    }

    /// Sleeps for the requested time, then echoes its label
    struct SleeperAgent;

    #[async_trait]
    impl Agent for SleeperAgent {
        fn class_name(&self) -> &str {
            "sleeper"
        }

        async fn invoke(&self, method: &str, args: serde_json::Value) -> Result<serde_json::Value> {
            match method {
                "nap" => {
                    let ms = args[0].as_u64().unwrap_or(0);
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    Ok(args[1].clone())
                }
                other => Err(FabricError::Invocation(format!("unknown method: {}", other))),
            }
        }
    }

    #[tokio::test]
    async fn test_proxy_round_trip() {
        let (transport, _host) = local_transport();
        let proxy = AgentProxy::create(transport, AgentSpec::new("echo").with_id("X"))
            .await
            .unwrap();

        let value = proxy
            .call("echo", json!(["hi"]), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(value, json!("hi"));
    }

    #[tokio::test]
    async fn test_eager_creation_failure_surfaces_at_construction() {
        let (transport, _host) = local_transport();
        let err = AgentProxy::create(transport, AgentSpec::new("missing-class"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, FabricError::ClassNotFound(_)));
    }

    #[tokio::test]
    async fn test_attach_to_unknown_id_fails_on_first_call() {
        let (transport, _host) = local_transport();
        let proxy = AgentProxy::attach(transport, "nobody");

        let err = proxy
            .call("echo", json!([]), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FabricError::AgentNotFound(_)));
    }

    #[tokio::test]
    async fn test_pipelined_calls_overlap() {
        let (transport, host) = local_transport();
        host.registry().register("sleeper", |_args| Ok(SleeperAgent));

        let mut proxies = Vec::new();
        for i in 0..5 {
            let spec = AgentSpec::new("sleeper").with_id(format!("s{}", i));
            proxies.push(AgentProxy::create(transport.clone(), spec).await.unwrap());
        }

        // Issue everything before consuming anything.
        let started = Instant::now();
        let mut pending = Vec::new();
        for (i, proxy) in proxies.iter().enumerate() {
            pending.push(proxy.invoke("nap", json!([200, i])).await.unwrap());
        }
        for (i, call) in pending.iter().enumerate() {
            let value = call.wait(Some(Duration::from_secs(5))).await.unwrap();
            assert_eq!(value, json!(i));
        }

        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_millis(600), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_remote_error_text_reaches_caller() {
        let (transport, _host) = local_transport();
        let script = r#"fn fail(state, args) { throw "original failure text" }"#;
        let proxy = AgentProxy::create(
            transport,
            AgentSpec::new("failer").with_script(script),
        )
        .await
        .unwrap();

        let err = proxy
            .call("fail", json!([]), Duration::from_secs(1))
            .await
            .unwrap_err();
        match err {
            FabricError::Invocation(text) => assert!(text.contains("original failure text")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wait_can_be_retried_after_timeout() {
        let (transport, host) = local_transport();
        host.registry().register("sleeper", |_args| Ok(SleeperAgent));

        let proxy = AgentProxy::create(transport, AgentSpec::new("sleeper").with_id("s"))
            .await
            .unwrap();
        let call = proxy.invoke("nap", json!([150, "done"])).await.unwrap();

        let impatient = call.wait(Some(Duration::from_millis(20))).await;
        assert!(matches!(impatient, Err(FabricError::WaitTimeout)));

        let patient = call.wait(Some(Duration::from_secs(2))).await.unwrap();
        assert_eq!(patient, json!("done"));
    }

    #[tokio::test]
    async fn test_register_classes_then_create_by_name() {
        let (transport, _host) = local_transport();
        let classes = vec![(
            "upper".to_string(),
            r#"fn shout(state, args) { args[0].to_upper() }"#.to_string(),
        )];
        assert_eq!(transport.register_classes(&classes).await.unwrap(), 1);

        let proxy = AgentProxy::create(transport, AgentSpec::new("upper"))
            .await
            .unwrap();
        let value = proxy
            .call("shout", json!(["quiet"]), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(value, json!("QUIET"));
    }

    #[tokio::test]
    async fn test_error_from_status_round_trip() {
        let err = error_from_status(status_round_trip(FabricError::AgentExists("a1".into())));
        assert!(matches!(err, FabricError::AgentExists(id) if id == "a1"));

        let err = error_from_status(status_round_trip(FabricError::ClassNotFound("k".into())));
        assert!(matches!(err, FabricError::ClassNotFound(name) if name == "k"));

        let err = error_from_status(status_round_trip(FabricError::WaitTimeout));
        assert!(matches!(err, FabricError::WaitTimeout));
    }

    fn status_round_trip(err: FabricError) -> tonic::Status {
        crate::rpc::status_from_error(err)
    }
}
