// src/agents/scripted.rs
//! Script-defined agents
//!
//! Realizes the "class shipped alongside the request" escape hatch: a
//! caller supplies a rhai script, the host compiles it once and constructs
//! instances from it. Both ends must trust each other; the script runs with
//! the engine's defaults and no filesystem or network access.
//!
//! # Script convention
//!
//! Every public function of the script is a callable method taking
//! `(state, args)`. `args` is the JSON argument value; `state` is whatever
//! the optional `init(args)` constructor returned (unit when absent). A
//! method returns either a plain value, or a map `#{ state: ..., value:
//! ... }` to update the instance state along with the reply:
//!
//! ```rhai
//! fn init(args) { #{ count: 0 } }
//!
//! fn add(state, args) {
//!     let next = state.count + args[0];
//!     #{ state: #{ count: next }, value: next }
//! }
//! ```

use crate::agents::Agent;
use crate::utils::errors::{FabricError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use rhai::{Dynamic, Engine, Scope, AST};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Agent whose methods are functions of a compiled rhai script
pub struct ScriptedAgent {
    class_name: String,
    engine: Arc<Engine>,
    ast: Arc<AST>,
    state: Mutex<Dynamic>,
}

impl ScriptedAgent {
    /// Construct an instance, running the script's `init(args)` if defined
    pub fn new(
        class_name: &str,
        engine: Arc<Engine>,
        ast: Arc<AST>,
        args: Value,
    ) -> Result<Self> {
        let state = if has_fn(&ast, "init", 1) {
            let args_dyn = to_dynamic(&args)?;
            engine
                .call_fn::<Dynamic>(&mut Scope::new(), &ast, "init", vec![args_dyn])
                .map_err(|e| FabricError::Construction(e.to_string()))?
        } else {
            Dynamic::UNIT
        };

        debug!("Constructed scripted agent of class {}", class_name);

        Ok(Self {
            class_name: class_name.to_string(),
            engine,
            ast,
            state: Mutex::new(state),
        })
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    async fn invoke(&self, method: &str, args: Value) -> Result<Value> {
        if !has_fn(&self.ast, method, 2) {
            return Err(FabricError::Invocation(format!("unknown method: {}", method)));
        }

        let args_dyn = to_dynamic(&args)?;
        let state = self.state.lock().clone();

        let result = self
            .engine
            .call_fn::<Dynamic>(
                &mut Scope::new(),
                &self.ast,
                method,
                vec![state, args_dyn],
            )
            .map_err(|e| FabricError::Invocation(e.to_string()))?;

        // A `#{ state, value }` map threads updated state back into the
        // instance; anything else is the reply as-is.
        if let Some(map) = result.clone().try_cast::<rhai::Map>() {
            if let (Some(state), Some(value)) = (map.get("state"), map.get("value")) {
                *self.state.lock() = state.clone();
                return from_dynamic(value);
            }
        }

        from_dynamic(&result)
    }
}

fn has_fn(ast: &AST, name: &str, arity: usize) -> bool {
    ast.iter_functions()
        .any(|f| f.name == name && f.params.len() == arity)
}

fn to_dynamic(value: &Value) -> Result<Dynamic> {
    rhai::serde::to_dynamic(value).map_err(|e| FabricError::Script(e.to_string()))
}

fn from_dynamic(value: &Dynamic) -> Result<Value> {
    rhai::serde::from_dynamic(value).map_err(|e| FabricError::Script(e.to_string()))
}
