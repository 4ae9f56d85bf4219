//! Client-facing handle to interact with the runtime.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{broadcast, mpsc, oneshot};

use script_core::{
    ActionRegistry, CodeBlock, CodeScript, ConditionRegistry, LineReport, ScriptCompiler,
    SlotStore, VariableStore,
};

use crate::error::{Result, RuntimeError};
use crate::events::{Event, EventBus, ScriptEvent, Topic, TriggerEvent};
use crate::repository::ScriptRepository;
use crate::worker::{Command, LineJob};

type ScriptCache = Arc<RwLock<HashMap<String, Arc<CodeScript>>>>;

/// Cloneable façade over the runtime: compile scripts, dispatch triggers,
/// inspect variables, subscribe to events.
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    scripts: ScriptCache,
    script_repo: Arc<dyn ScriptRepository>,
    variables: Arc<VariableStore>,
    actions: Arc<ActionRegistry>,
    conditions: Arc<ConditionRegistry>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        scripts: ScriptCache,
        script_repo: Arc<dyn ScriptRepository>,
        variables: Arc<VariableStore>,
        actions: Arc<ActionRegistry>,
        conditions: Arc<ConditionRegistry>,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            scripts,
            script_repo,
            variables,
            actions,
            conditions,
        }
    }

    /// Compiles authored rows, persists the result, and swaps it into the
    /// live cache. This is the explicit "save code" trigger; nothing
    /// recompiles on block mutation.
    pub fn compile_and_save(
        &self,
        name: &str,
        rows: &[Vec<CodeBlock>],
        slots: &dyn SlotStore,
    ) -> Result<CodeScript> {
        let compiler = ScriptCompiler::new(&self.actions, &self.conditions);
        let script = compiler.compile(name, rows, slots);

        self.script_repo.save(&script)?;
        self.scripts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(script.name.clone(), Arc::new(script.clone()));

        self.event_bus.publish(Event::Script(ScriptEvent::Compiled {
            script: script.name.clone(),
            line_count: script.lines.len(),
            diagnostic_count: script.diagnostics.len(),
        }));

        Ok(script)
    }

    /// Enables or disables a loaded script, persisting the change.
    pub fn set_script_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let mut scripts = self.scripts.write().unwrap_or_else(PoisonError::into_inner);
        let current = scripts.get(name).ok_or_else(|| RuntimeError::UnknownScript {
            name: name.to_string(),
        })?;

        let mut updated = CodeScript::clone(current);
        updated.enabled = enabled;
        self.script_repo.save(&updated)?;
        scripts.insert(name.to_string(), Arc::new(updated));
        Ok(())
    }

    /// Dispatches one trigger: filters matching lines on the calling thread
    /// (pure data traversal), then hands interpretation to the worker task.
    pub async fn dispatch(&self, trigger: TriggerEvent) -> Result<Vec<LineReport>> {
        let jobs = self.matching_jobs(&trigger);
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::RunLines {
                jobs,
                trigger,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Lines across all enabled cached scripts bound to the trigger's event.
    fn matching_jobs(&self, trigger: &TriggerEvent) -> Vec<LineJob> {
        let scripts = self.scripts.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<&String> = scripts.keys().collect();
        names.sort_unstable();

        names
            .into_iter()
            .flat_map(|name| {
                let script = &scripts[name];
                script
                    .matching_lines(trigger.kind)
                    .map(|line| LineJob {
                        script: script.name.clone(),
                        line: line.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// A loaded script by name.
    pub fn script(&self, name: &str) -> Option<Arc<CodeScript>> {
        self.scripts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Names of all loaded scripts, sorted.
    pub fn script_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .scripts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort_unstable();
        names
    }

    /// The shared variable store.
    pub fn variables(&self) -> Arc<VariableStore> {
        Arc::clone(&self.variables)
    }

    /// Publishes a trigger onto the bus; the runtime's own subscription will
    /// pick it up and dispatch it.
    pub fn publish_trigger(&self, trigger: TriggerEvent) {
        self.event_bus.publish(Event::Trigger(trigger));
    }

    /// Subscribe to a bus topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub(crate) async fn send_shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
