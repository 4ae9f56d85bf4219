//! High-level runtime orchestrator.
//!
//! The runtime owns the script worker, wires up command/event channels, and
//! exposes a builder-based API for hosts. [`crate::RuntimeHandle`] provides
//! a cloneable façade for clients.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use script_core::{
    ActionHandler, ActionRegistry, ConditionHandler, ConditionRegistry, DiagnosticSink,
    ExecutionEngine, TracingSink, VariableStore,
};
use tracing::{debug, warn};

use crate::error::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::handle::RuntimeHandle;
use crate::handlers::register_defaults;
use crate::repository::{
    InMemoryScriptRepo, InMemoryVariableRepo, ScriptRepository, VariableRepository,
};
use crate::worker::ScriptWorker;
use crate::world::{PlayerDirectory, WorldSink};

/// Runtime configuration shared across the orchestrator and worker.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Per-line step budget; 0 disables the bound.
    pub max_actions_per_line: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            command_buffer_size: 32,
            max_actions_per_line: 1024,
        }
    }
}

/// Main runtime that owns the script worker and trigger subscription.
pub struct Runtime {
    handle: RuntimeHandle,
    variable_repo: Arc<dyn VariableRepository>,
    worker_handle: JoinHandle<()>,
    trigger_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully: stop the trigger subscription, drain
    /// the worker, and flush PERSISTENT variables to the repository.
    pub async fn shutdown(self) -> Result<()> {
        self.trigger_handle.abort();

        self.handle.send_shutdown().await?;
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)?;

        let entries = self.handle.variables().persistent_entries();
        self.variable_repo.save_all(&entries)?;
        debug!(
            target: "runtime",
            persistent = entries.len(),
            "runtime stopped, variables flushed"
        );
        Ok(())
    }
}

/// Builder wiring collaborators, repositories, and extra handlers.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<Arc<dyn WorldSink>>,
    players: Option<Arc<dyn PlayerDirectory>>,
    script_repo: Option<Arc<dyn ScriptRepository>>,
    variable_repo: Option<Arc<dyn VariableRepository>>,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
    extra_actions: Vec<Arc<dyn ActionHandler>>,
    extra_conditions: Vec<Arc<dyn ConditionHandler>>,
    defaults: bool,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
            players: None,
            script_repo: None,
            variable_repo: None,
            diagnostics: None,
            extra_actions: Vec::new(),
            extra_conditions: Vec::new(),
            defaults: true,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_world(mut self, world: Arc<dyn WorldSink>) -> Self {
        self.world = Some(world);
        self
    }

    #[must_use]
    pub fn with_players(mut self, players: Arc<dyn PlayerDirectory>) -> Self {
        self.players = Some(players);
        self
    }

    #[must_use]
    pub fn with_script_repository(mut self, repo: Arc<dyn ScriptRepository>) -> Self {
        self.script_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn with_variable_repository(mut self, repo: Arc<dyn VariableRepository>) -> Self {
        self.variable_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Adds a host-specific action on top of the defaults.
    #[must_use]
    pub fn with_action(mut self, handler: Arc<dyn ActionHandler>) -> Self {
        self.extra_actions.push(handler);
        self
    }

    /// Adds a host-specific condition on top of the defaults.
    #[must_use]
    pub fn with_condition(mut self, handler: Arc<dyn ConditionHandler>) -> Self {
        self.extra_conditions.push(handler);
        self
    }

    /// Skips registration of the built-in handler set.
    #[must_use]
    pub fn without_default_handlers(mut self) -> Self {
        self.defaults = false;
        self
    }

    /// Builds and starts the runtime.
    ///
    /// Loads persisted variables and scripts, spawns the script worker and
    /// the trigger subscription task. Must be called inside a tokio runtime.
    pub fn build(self) -> Result<Runtime> {
        let world = self.world.ok_or(RuntimeError::MissingWorld)?;
        let players = self.players.ok_or(RuntimeError::MissingPlayers)?;
        let script_repo = self
            .script_repo
            .unwrap_or_else(|| Arc::new(InMemoryScriptRepo::new()));
        let variable_repo = self
            .variable_repo
            .unwrap_or_else(|| Arc::new(InMemoryVariableRepo::new()));
        let diagnostics = self.diagnostics.unwrap_or_else(|| Arc::new(TracingSink));

        // Seed PERSISTENT scope before anything can run.
        let variables = Arc::new(VariableStore::new());
        variables.load_persistent(variable_repo.load_all()?);

        let mut actions = ActionRegistry::new();
        let mut conditions = ConditionRegistry::new();
        if self.defaults {
            register_defaults(
                &mut actions,
                &mut conditions,
                world,
                players,
                Arc::clone(&variables),
            );
        }
        for handler in self.extra_actions {
            actions.register(handler);
        }
        for handler in self.extra_conditions {
            conditions.register(handler);
        }
        let actions = Arc::new(actions);
        let conditions = Arc::new(conditions);

        let engine = ExecutionEngine::new(
            Arc::clone(&actions),
            Arc::clone(&conditions),
            Arc::clone(&variables),
            diagnostics,
        )
        .with_step_budget(self.config.max_actions_per_line);

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);

        let worker = ScriptWorker::new(engine, command_rx, event_bus.clone());
        let worker_handle = tokio::spawn(worker.run());

        // Load previously saved scripts into the live cache.
        let mut cache = HashMap::new();
        for name in script_repo.list()? {
            if let Some(script) = script_repo.load(&name)? {
                cache.insert(name, Arc::new(script));
            }
        }
        debug!(target: "runtime", scripts = cache.len(), "scripts loaded");

        let handle = RuntimeHandle::new(
            command_tx,
            event_bus.clone(),
            Arc::new(RwLock::new(cache)),
            script_repo,
            variables,
            actions,
            conditions,
        );

        // Subscribe before spawning so triggers published right after build()
        // cannot slip past the receiver.
        let trigger_rx = event_bus.subscribe(Topic::Trigger);
        let trigger_handle = tokio::spawn(trigger_loop(handle.clone(), trigger_rx));

        Ok(Runtime {
            handle,
            variable_repo,
            worker_handle,
            trigger_handle,
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription task: the runtime owns its trigger delivery instead of
/// leaning on host framework listeners. Hosts publish to [`Topic::Trigger`]
/// and this loop dispatches.
async fn trigger_loop(handle: RuntimeHandle, mut receiver: broadcast::Receiver<Event>) {
    loop {
        match receiver.recv().await {
            Ok(Event::Trigger(trigger)) => {
                if let Err(error) = handle.dispatch(trigger).await {
                    warn!(target: "runtime", %error, "trigger dispatch failed");
                    break;
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(missed)) => {
                warn!(target: "runtime", missed, "trigger subscription lagged, events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
