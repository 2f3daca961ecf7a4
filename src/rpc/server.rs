// src/rpc/server.rs
//! gRPC service implementation
//!
//! Thin mapping from the wire contract onto [`AgentHost`]. Invocation
//! outcomes travel inside `FetchResultReply` as a four-way oneof so the
//! caller can always tell a value, a remote error, an expired ticket, and a
//! timed-out wait apart.

use crate::host::AgentHost;
use crate::pool::Ticket;
use crate::rpc::pb::agent_fabric_server::AgentFabric;
use crate::rpc::pb::{
    fetch_result_reply, CreateAgentReply, CreateAgentRequest, FetchResultReply,
    FetchResultRequest, InvokeReply, InvokeRequest, RegisterClassesReply, RegisterClassesRequest,
    RemoveAgentReply, RemoveAgentRequest, ShutdownReply, ShutdownRequest,
};
use crate::rpc::status_from_error;
use crate::utils::errors::FabricError;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};
use tracing::info;

pub struct FabricService {
    host: Arc<AgentHost>,

    /// Cancelled by the Shutdown rpc; the launcher watches it
    cancel: CancellationToken,
}

impl FabricService {
    pub fn new(host: Arc<AgentHost>, cancel: CancellationToken) -> Self {
        Self { host, cancel }
    }
}

fn parse_args(raw: &[u8]) -> Result<Value, Status> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(raw)
        .map_err(|e| Status::invalid_argument(format!("malformed args payload: {}", e)))
}

fn non_empty(raw: String) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw)
    }
}

#[tonic::async_trait]
impl AgentFabric for FabricService {
    async fn create_agent(
        &self,
        request: Request<CreateAgentRequest>,
    ) -> Result<Response<CreateAgentReply>, Status> {
        let req = request.into_inner();
        let args = parse_args(&req.args_json)?;
        let agent_id = non_empty(req.agent_id);
        let script = non_empty(req.inline_script);

        let agent_id = self
            .host
            .create_agent(agent_id, &req.class_name, args, script.as_deref())
            .await
            .map_err(status_from_error)?;

        Ok(Response::new(CreateAgentReply { agent_id }))
    }

    async fn invoke(
        &self,
        request: Request<InvokeRequest>,
    ) -> Result<Response<InvokeReply>, Status> {
        let req = request.into_inner();
        let args = parse_args(&req.args_json)?;

        let ticket = self
            .host
            .dispatch(&req.agent_id, &req.method, args)
            .await
            .map_err(status_from_error)?;

        Ok(Response::new(InvokeReply { ticket: ticket.0 }))
    }

    async fn fetch_result(
        &self,
        request: Request<FetchResultRequest>,
    ) -> Result<Response<FetchResultReply>, Status> {
        let req = request.into_inner();
        let timeout = if req.timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(req.timeout_ms))
        };

        let outcome = match self.host.pool().get(Ticket(req.ticket), timeout).await {
            Ok(crate::pool::CallOutcome::Value(value)) => {
                let bytes = serde_json::to_vec(&value)
                    .map_err(|e| Status::internal(format!("result encoding failed: {}", e)))?;
                fetch_result_reply::Outcome::ValueJson(bytes)
            }
            Ok(crate::pool::CallOutcome::Error(text)) => fetch_result_reply::Outcome::Error(text),
            Err(FabricError::TicketExpired(_)) => fetch_result_reply::Outcome::Expired(true),
            Err(FabricError::WaitTimeout) => fetch_result_reply::Outcome::TimedOut(true),
            Err(other) => return Err(status_from_error(other)),
        };

        Ok(Response::new(FetchResultReply {
            outcome: Some(outcome),
        }))
    }

    async fn register_classes(
        &self,
        request: Request<RegisterClassesRequest>,
    ) -> Result<Response<RegisterClassesReply>, Status> {
        let req = request.into_inner();
        let mut registered = 0u32;

        for class in req.classes {
            self.host
                .registry()
                .register_script(&class.class_name, &class.script)
                .map_err(status_from_error)?;
            registered += 1;
        }

        Ok(Response::new(RegisterClassesReply { registered }))
    }

    async fn remove_agent(
        &self,
        request: Request<RemoveAgentRequest>,
    ) -> Result<Response<RemoveAgentReply>, Status> {
        let req = request.into_inner();
        self.host
            .remove_agent(&req.agent_id)
            .await
            .map_err(status_from_error)?;
        Ok(Response::new(RemoveAgentReply {}))
    }

    async fn shutdown(
        &self,
        _request: Request<ShutdownRequest>,
    ) -> Result<Response<ShutdownReply>, Status> {
        info!("Shutdown requested over the wire");
        // Reply first; the launcher stops accepting and drains the host.
        self.cancel.cancel();
        Ok(Response::new(ShutdownReply {}))
    }
}
