// src/agents/echo.rs
//! Echo builtin
//!
//! Returns its arguments unchanged. Registered under the class name
//! `"echo"` by default; mostly useful for smoke tests and connectivity
//! checks against a running host.

use crate::agents::Agent;
use crate::utils::errors::{FabricError, Result};
use async_trait::async_trait;
use serde_json::Value;

pub struct EchoAgent;

impl EchoAgent {
    pub const CLASS_NAME: &'static str = "echo";

    pub fn new(_args: Value) -> Result<Self> {
        Ok(Self)
    }
}

#[async_trait]
impl Agent for EchoAgent {
    fn class_name(&self) -> &str {
        Self::CLASS_NAME
    }

    async fn invoke(&self, method: &str, args: Value) -> Result<Value> {
        match method {
            // A single-element argument list echoes as the bare element.
            "echo" => match args {
                Value::Array(mut items) if items.len() == 1 => Ok(items.remove(0)),
                other => Ok(other),
            },
            "ping" => Ok(Value::String("pong".to_string())),
            other => Err(FabricError::Invocation(format!("unknown method: {}", other))),
        }
    }
}
