//! Pluggable action and condition registries.
//!
//! Handlers are pure with respect to the registry: it holds no mutable state
//! beyond the id map, and side-effect collaborators are injected into each
//! handler at construction, never threaded through dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use crate::block::ActionId;
use crate::context::ExecutionContext;
use crate::error::ResolutionError;
use crate::value::ResolvedArgs;

/// Outcome of one action dispatch.
///
/// Business failures ("target player not found") are data carried here;
/// only truly unexpected faults surface as engine-level errors.
#[derive(Clone, Debug, PartialEq)]
pub enum ExecutionResult {
    Success,
    Error(String),
}

impl ExecutionResult {
    pub fn success() -> Self {
        Self::Success
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Error(message) => Some(message),
        }
    }
}

/// An executable action.
pub trait ActionHandler: Send + Sync {
    fn id(&self) -> &str;

    fn execute(&self, ctx: &ExecutionContext, args: &ResolvedArgs) -> ExecutionResult;
}

/// A condition evaluated by IF blocks.
pub trait ConditionHandler: Send + Sync {
    fn id(&self) -> &str;

    fn evaluate(
        &self,
        ctx: &ExecutionContext,
        args: &ResolvedArgs,
    ) -> Result<bool, ResolutionError>;
}

/// Map from action ids to handlers.
pub struct ActionRegistry {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers a handler under its own id, replacing any previous one.
    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) {
        let id = handler.id().to_string();
        if self.handlers.insert(id.clone(), handler).is_some() {
            tracing::debug!(target: "script_core::registry", action = %id, "handler replaced");
        }
    }

    pub fn get(&self, id: &ActionId) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(id.as_str()).cloned()
    }

    pub fn contains(&self, id: &ActionId) -> bool {
        self.handlers.contains_key(id.as_str())
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Map from condition ids to handlers.
pub struct ConditionRegistry {
    handlers: HashMap<String, Arc<dyn ConditionHandler>>,
}

impl ConditionRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, handler: Arc<dyn ConditionHandler>) {
        let id = handler.id().to_string();
        if self.handlers.insert(id.clone(), handler).is_some() {
            tracing::debug!(target: "script_core::registry", condition = %id, "handler replaced");
        }
    }

    pub fn get(&self, id: &ActionId) -> Option<Arc<dyn ConditionHandler>> {
        self.handlers.get(id.as_str()).cloned()
    }

    pub fn contains(&self, id: &ActionId) -> bool {
        self.handlers.contains_key(id.as_str())
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for ConditionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
