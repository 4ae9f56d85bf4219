//! File-backed repositories: one JSON document per script plus a single
//! variables file under a base directory.
//!
//! Scripts are small, author-inspected artifacts, so the format favors
//! readability (pretty JSON) over density.

use std::fs;
use std::path::{Path, PathBuf};

use script_core::{CodeScript, DataValue};

use super::{RepositoryError, Result, ScriptRepository, VariableRepository};

// Distinct suffix so a script repository and a variable repository can share
// one base directory without the variables file listing as a script.
const SCRIPT_SUFFIX: &str = ".script.json";
const VARIABLES_FILE: &str = "variables.json";

/// Stores each script as `<base>/<name>.script.json`.
pub struct FileScriptRepository {
    base_dir: PathBuf,
}

impl FileScriptRepository {
    /// Opens (and creates) the base directory.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        tracing::debug!(target: "runtime::repository", dir = %base_dir.display(), "script repository opened");
        Ok(Self { base_dir })
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        // Script names become file names; reject anything that would escape
        // the base directory.
        if name.is_empty()
            || name
                .chars()
                .any(|c| c == '/' || c == '\\' || c == '.' || c.is_control())
        {
            return Err(RepositoryError::InvalidName(name.to_string()));
        }
        Ok(self.base_dir.join(format!("{name}{SCRIPT_SUFFIX}")))
    }
}

impl ScriptRepository for FileScriptRepository {
    fn save(&self, script: &CodeScript) -> Result<()> {
        let path = self.path_for(&script.name)?;
        let json = serde_json::to_string_pretty(script)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;
        fs::write(&path, json)?;
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<CodeScript>> {
        let path = self.path_for(name)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let script =
            serde_json::from_str(&raw).map_err(|e| RepositoryError::Json(e.to_string()))?;
        Ok(Some(script))
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let file_name = entry?.file_name();
            if let Some(name) = file_name
                .to_str()
                .and_then(|raw| raw.strip_suffix(SCRIPT_SUFFIX))
            {
                names.push(name.to_string());
            }
        }
        names.sort_unstable();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Stores the PERSISTENT variable snapshot as `<base>/variables.json`.
pub struct FileVariableRepository {
    path: PathBuf,
}

impl FileVariableRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir)?;
        Ok(Self {
            path: base_dir.join(VARIABLES_FILE),
        })
    }
}

impl VariableRepository for FileVariableRepository {
    fn load_all(&self) -> Result<Vec<(String, DataValue)>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw).map_err(|e| RepositoryError::Json(e.to_string()))
    }

    fn save_all(&self, entries: &[(String, DataValue)]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use script_core::{CodeLine, EventKind};
    use tempfile::TempDir;

    fn script(name: &str) -> CodeScript {
        CodeScript::new(name, vec![CodeLine::new(EventKind::PlayerJoin, vec![])], vec![])
    }

    #[test]
    fn script_round_trip_and_listing() {
        let dir = TempDir::new().unwrap();
        let repo = FileScriptRepository::new(dir.path()).unwrap();

        repo.save(&script("spawn")).unwrap();
        repo.save(&script("arena")).unwrap();

        assert_eq!(repo.list().unwrap(), vec!["arena", "spawn"]);
        assert_eq!(repo.load("spawn").unwrap(), Some(script("spawn")));
        assert_eq!(repo.load("absent").unwrap(), None);

        repo.delete("spawn").unwrap();
        assert_eq!(repo.list().unwrap(), vec!["arena"]);
    }

    #[test]
    fn rejects_names_that_escape_the_base_dir() {
        let dir = TempDir::new().unwrap();
        let repo = FileScriptRepository::new(dir.path()).unwrap();

        assert!(matches!(
            repo.load("../evil"),
            Err(RepositoryError::InvalidName(_))
        ));
        assert!(matches!(repo.load(""), Err(RepositoryError::InvalidName(_))));
    }

    #[test]
    fn variable_snapshot_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = FileVariableRepository::new(dir.path()).unwrap();

        assert_eq!(repo.load_all().unwrap(), vec![]);

        let entries = vec![
            ("visits".to_string(), DataValue::Number(12.0)),
            ("motd".to_string(), DataValue::text("hi")),
        ];
        repo.save_all(&entries).unwrap();
        assert_eq!(repo.load_all().unwrap(), entries);
    }
}
