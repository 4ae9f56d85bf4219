//! Runtime orchestration for the block-scripting engine.
//!
//! This crate wires the pure engine from `script-core` into a running host:
//! repositories for persistence, a topic-based event bus for trigger
//! delivery, the single script worker that serializes interpretation, and
//! the built-in action/condition handler set. Consumers embed [`Runtime`]
//! and interact through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`events`] provides the topic-based event bus (the trigger seam)
//! - [`worker`] keeps interpretation on one cooperative task
//! - [`handlers`] and [`world`] hold the built-in handlers and their
//!   collaborator traits
//! - [`repository`] persists scripts and PERSISTENT variables
pub mod diagnostics;
pub mod events;
pub mod handlers;
pub mod repository;
pub mod runtime;
pub mod world;

mod error;
mod handle;
mod worker;

pub use diagnostics::ChatSink;
pub use error::{Result, RuntimeError};
pub use events::{Event, EventBus, ScriptEvent, Topic, TriggerEvent};
pub use handle::RuntimeHandle;
pub use handlers::register_defaults;
pub use repository::{
    FileScriptRepository, FileVariableRepository, InMemoryScriptRepo, InMemoryVariableRepo,
    RepositoryError, ScriptRepository, VariableRepository,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use world::{PlayerDirectory, WorldSink};
