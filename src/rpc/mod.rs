// src/rpc/mod.rs
//! gRPC wire surface
//!
//! The proto contract lives in `proto/fabric.proto`; `build.rs` compiles it
//! into `src/generated/`. This module re-exports the generated bindings and
//! maps crate errors onto gRPC status codes.

pub mod server;

pub use server::FabricService;

/// Generated protobuf/tonic bindings
#[allow(clippy::all)]
pub mod pb {
    include!("../generated/fabric.v1.rs");

    /// Serialized descriptors for the reflection service
    pub const FILE_DESCRIPTOR_SET: &[u8] = include_bytes!("../generated/fabric_descriptor.bin");
}

use crate::utils::errors::FabricError;
use tonic::Status;

/// Map a crate error onto the closest gRPC status
///
/// Invocation errors normally travel inside `FetchResultReply`, not as a
/// status; the `Internal` arm only covers the `dispatch_sync`-style paths.
pub fn status_from_error(err: FabricError) -> Status {
    match &err {
        FabricError::HostFull(_) => Status::resource_exhausted(err.to_string()),
        FabricError::AgentNotFound(_)
        | FabricError::ClassNotFound(_)
        | FabricError::TicketExpired(_) => Status::not_found(err.to_string()),
        FabricError::AgentExists(_) => Status::already_exists(err.to_string()),
        FabricError::WaitTimeout => Status::deadline_exceeded(err.to_string()),
        FabricError::TicketResolved(_) => Status::failed_precondition(err.to_string()),
        FabricError::Construction(_)
        | FabricError::Script(_)
        | FabricError::Serialization(_)
        | FabricError::Config(_) => Status::invalid_argument(err.to_string()),
        FabricError::Invocation(_) => Status::internal(err.to_string()),
        FabricError::Transport(_) | FabricError::Storage(_) => Status::unavailable(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_status_codes() {
        let status = status_from_error(FabricError::HostFull("full".into()));
        assert_eq!(status.code(), Code::ResourceExhausted);

        let status = status_from_error(FabricError::AgentNotFound("x".into()));
        assert_eq!(status.code(), Code::NotFound);
        assert!(status.message().contains("agent not found: x"));

        let status = status_from_error(FabricError::WaitTimeout);
        assert_eq!(status.code(), Code::DeadlineExceeded);
    }
}
