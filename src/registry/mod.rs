// src/registry/mod.rs
//! Agent class registry
//!
//! Maps class names to constructors. Populated with builtins at startup,
//! extended at runtime when callers ship script classes alongside their
//! requests. The registry is an explicitly-owned object handed to the host
//! at construction; tests and shutdown tear it down with `clear`.

use crate::agents::{Agent, AgentRef, EchoAgent, ScriptedAgent};
use crate::utils::errors::{FabricError, Result};
use dashmap::DashMap;
use rhai::{Engine, AST};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Constructor for one agent class
pub type AgentFactory = Arc<dyn Fn(Value) -> Result<AgentRef> + Send + Sync>;

/// Process-wide map of constructable agent classes
///
/// `register` is last-write-wins: re-registering a name replaces the
/// factory for future constructions without touching live instances.
pub struct AgentRegistry {
    classes: DashMap<String, AgentFactory>,

    /// One engine shared by every scripted class
    engine: Arc<Engine>,
}

impl AgentRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            classes: DashMap::new(),
            engine: Arc::new(Engine::new()),
        }
    }

    /// Registry pre-populated with the builtin classes
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(EchoAgent::CLASS_NAME, EchoAgent::new);
        registry
    }

    /// Register a native class; last write wins
    pub fn register<F, A>(&self, class_name: &str, factory: F)
    where
        F: Fn(Value) -> Result<A> + Send + Sync + 'static,
        A: Agent + 'static,
    {
        let factory: AgentFactory = Arc::new(move |args| Ok(Arc::new(factory(args)?) as AgentRef));
        if self.classes.insert(class_name.to_string(), factory).is_some() {
            debug!("Replaced class registration for {}", class_name);
        } else {
            debug!("Registered class {}", class_name);
        }
    }

    /// Compile a rhai script and register it as a class; last write wins
    pub fn register_script(&self, class_name: &str, source: &str) -> Result<()> {
        let ast: Arc<AST> = Arc::new(
            self.engine
                .compile(source)
                .map_err(|e| FabricError::Script(format!("{}: {}", class_name, e)))?,
        );

        let engine = Arc::clone(&self.engine);
        let name = class_name.to_string();
        let factory: AgentFactory = Arc::new(move |args| {
            Ok(Arc::new(ScriptedAgent::new(
                &name,
                Arc::clone(&engine),
                Arc::clone(&ast),
                args,
            )?) as AgentRef)
        });

        self.classes.insert(class_name.to_string(), factory);
        info!("Registered script class {}", class_name);
        Ok(())
    }

    /// Look up a class constructor
    pub fn resolve(&self, class_name: &str) -> Result<AgentFactory> {
        self.classes
            .get(class_name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| FabricError::ClassNotFound(class_name.to_string()))
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Explicit teardown; drops every registration
    pub fn clear(&self) {
        self.classes.clear();
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
