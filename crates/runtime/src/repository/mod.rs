//! Repository layer for data that outlives a single execution pass.
//!
//! Repositories persist the two durable artifacts of the engine:
//! - Compiled scripts (rebuilt on explicit save, loaded at startup)
//! - PERSISTENT-scope variables (flushed at shutdown, loaded at startup)
//!
//! The on-disk schema is this crate's concern alone; the engine core only
//! ever sees the trait contracts.

mod file;
mod memory;

pub use file::{FileScriptRepository, FileVariableRepository};
pub use memory::{InMemoryScriptRepo, InMemoryVariableRepo};

use thiserror::Error;

use script_core::{CodeScript, DataValue};

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("invalid script name `{0}`")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Repository for compiled script persistence.
pub trait ScriptRepository: Send + Sync {
    /// Save a script under its own name, replacing any previous version
    fn save(&self, script: &CodeScript) -> Result<()>;

    /// Load a script by name
    fn load(&self, name: &str) -> Result<Option<CodeScript>>;

    /// List all stored script names
    fn list(&self) -> Result<Vec<String>>;

    /// Delete a script
    fn delete(&self, name: &str) -> Result<()>;
}

/// Repository backing the PERSISTENT variable scope.
pub trait VariableRepository: Send + Sync {
    /// Load every persisted variable
    fn load_all(&self) -> Result<Vec<(String, DataValue)>>;

    /// Replace the stored set with the given snapshot
    fn save_all(&self, entries: &[(String, DataValue)]) -> Result<()>;
}
