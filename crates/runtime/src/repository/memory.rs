//! In-memory repository implementations for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use script_core::{CodeScript, DataValue};

use super::{RepositoryError, Result, ScriptRepository, VariableRepository};

/// In-memory implementation of [`ScriptRepository`].
pub struct InMemoryScriptRepo {
    scripts: RwLock<HashMap<String, CodeScript>>,
}

impl InMemoryScriptRepo {
    pub fn new() -> Self {
        Self {
            scripts: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryScriptRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptRepository for InMemoryScriptRepo {
    fn save(&self, script: &CodeScript) -> Result<()> {
        let mut scripts = self
            .scripts
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        scripts.insert(script.name.clone(), script.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<CodeScript>> {
        let scripts = self
            .scripts
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(scripts.get(name).cloned())
    }

    fn list(&self) -> Result<Vec<String>> {
        let scripts = self
            .scripts
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut names: Vec<String> = scripts.keys().cloned().collect();
        names.sort_unstable();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut scripts = self
            .scripts
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        scripts.remove(name);
        Ok(())
    }
}

/// In-memory implementation of [`VariableRepository`].
pub struct InMemoryVariableRepo {
    entries: RwLock<Vec<(String, DataValue)>>,
}

impl InMemoryVariableRepo {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryVariableRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableRepository for InMemoryVariableRepo {
    fn load_all(&self) -> Result<Vec<(String, DataValue)>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries.clone())
    }

    fn save_all(&self, entries: &[(String, DataValue)]) -> Result<()> {
        let mut stored = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *stored = entries.to_vec();
        Ok(())
    }
}
