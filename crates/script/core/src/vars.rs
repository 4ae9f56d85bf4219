//! Multi-scope variable table.
//!
//! One owned [`VariableStore`] instance is created at engine start and passed
//! by reference into the interpreter and all handlers; there is no process
//! global. All maps sit behind `std::sync::RwLock` so the store is safe to
//! call from the filtering side and the interpreter side of the worker
//! handoff; `increment` holds the write lock across its read-modify-write,
//! which makes it atomic per key.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::VariableError;
use crate::value::{DataValue, PlayerId};

/// Identifier of one execution pass, minted by the interpreter. LOCAL
/// variables are keyed by it and reaped when the pass ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InvocationId(pub u64);

/// Variable namespaces.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Scope {
    /// Per execution pass, reaped when the pass ends.
    Local,
    /// Per player, outlives a single pass.
    Player,
    /// Process-wide.
    Global,
    /// Process-wide, conventionally reserved for host-level state.
    Server,
    /// Process-wide and flushed to the persistence collaborator.
    Persistent,
    /// Computed on read by a registered supplier, never stored.
    Dynamic,
}

/// Owner half of a variable key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    None,
    Player(PlayerId),
    Invocation(InvocationId),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct VariableKey {
    scope: Scope,
    owner: Owner,
    name: String,
}

impl VariableKey {
    fn new(scope: Scope, owner: Owner, name: &str) -> Self {
        // GLOBAL/SERVER/PERSISTENT are unowned namespaces; normalizing here
        // keeps get/set symmetric whatever the caller passes.
        let owner = match scope {
            Scope::Player | Scope::Local => owner,
            _ => Owner::None,
        };
        Self {
            scope,
            owner,
            name: name.to_string(),
        }
    }
}

type DynamicSupplier = Arc<dyn Fn() -> DataValue + Send + Sync>;

/// Thread-safe multi-scope key/value table.
pub struct VariableStore {
    entries: RwLock<HashMap<VariableKey, DataValue>>,
    suppliers: RwLock<HashMap<String, DynamicSupplier>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            suppliers: RwLock::new(HashMap::new()),
        }
    }

    /// Reads a variable. DYNAMIC invokes the supplier synchronously and
    /// returns its result without caching.
    pub fn get(&self, scope: Scope, owner: Owner, name: &str) -> Option<DataValue> {
        if scope == Scope::Dynamic {
            let supplier = self
                .suppliers
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(name)
                .cloned()?;
            // Invoke outside the lock; suppliers may be arbitrarily slow.
            return Some(supplier());
        }

        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&VariableKey::new(scope, owner, name))
            .cloned()
    }

    pub fn set(
        &self,
        scope: Scope,
        owner: Owner,
        name: &str,
        value: DataValue,
    ) -> Result<(), VariableError> {
        if scope == Scope::Dynamic {
            return Err(VariableError::DynamicNotWritable {
                name: name.to_string(),
            });
        }

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(VariableKey::new(scope, owner, name), value);
        Ok(())
    }

    /// Adds `delta` to a numeric variable, creating it at 0 when absent.
    /// The result is always stored as NUMBER. Atomic per key: the write lock
    /// spans the whole read-modify-write.
    pub fn increment(
        &self,
        scope: Scope,
        owner: Owner,
        name: &str,
        delta: f64,
    ) -> Result<f64, VariableError> {
        if scope == Scope::Dynamic {
            return Err(VariableError::DynamicNotWritable {
                name: name.to_string(),
            });
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let key = VariableKey::new(scope, owner, name);
        let current = match entries.get(&key) {
            None => 0.0,
            Some(value) => value.as_number().map_err(|_| VariableError::NotANumber {
                name: name.to_string(),
            })?,
        };
        let next = current + delta;
        entries.insert(key, DataValue::Number(next));
        Ok(next)
    }

    /// Drops every entry of one scope/owner pair.
    pub fn clear(&self, scope: Scope, owner: Owner) {
        let probe = VariableKey::new(scope, owner, "");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| key.scope != probe.scope || key.owner != probe.owner);
    }

    /// Registers a DYNAMIC supplier, replacing any previous one of the name.
    pub fn register_dynamic(
        &self,
        name: impl Into<String>,
        supplier: impl Fn() -> DataValue + Send + Sync + 'static,
    ) {
        self.suppliers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), Arc::new(supplier));
    }

    pub fn unregister_dynamic(&self, name: &str) {
        self.suppliers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }

    /// Snapshot of the PERSISTENT scope for the persistence collaborator.
    pub fn persistent_entries(&self) -> Vec<(String, DataValue)> {
        let mut entries: Vec<(String, DataValue)> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(key, _)| key.scope == Scope::Persistent)
            .map(|(key, value)| (key.name.clone(), value.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Seeds the PERSISTENT scope from previously saved entries.
    pub fn load_persistent(&self, entries: impl IntoIterator<Item = (String, DataValue)>) {
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for (name, value) in entries {
            map.insert(VariableKey::new(Scope::Persistent, Owner::None, &name), value);
        }
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::thread;

    #[test]
    fn unowned_scopes_normalize_owner() {
        let store = VariableStore::new();
        store
            .set(
                Scope::Global,
                Owner::Player(PlayerId(7)),
                "n",
                DataValue::Number(1.0),
            )
            .unwrap();
        assert_eq!(
            store.get(Scope::Global, Owner::None, "n"),
            Some(DataValue::Number(1.0))
        );
    }

    #[test]
    fn player_scope_is_owner_keyed() {
        let store = VariableStore::new();
        store
            .set(
                Scope::Player,
                Owner::Player(PlayerId(1)),
                "kills",
                DataValue::Number(3.0),
            )
            .unwrap();
        assert_eq!(store.get(Scope::Player, Owner::Player(PlayerId(2)), "kills"), None);
    }

    #[test]
    fn increment_creates_at_zero_and_rejects_non_numbers() {
        let store = VariableStore::new();
        assert_eq!(
            store.increment(Scope::Global, Owner::None, "n", 2.5).unwrap(),
            2.5
        );
        assert_eq!(
            store.get(Scope::Global, Owner::None, "n"),
            Some(DataValue::Number(2.5))
        );

        store
            .set(Scope::Global, Owner::None, "word", DataValue::text("hi"))
            .unwrap();
        assert!(matches!(
            store.increment(Scope::Global, Owner::None, "word", 1.0),
            Err(VariableError::NotANumber { .. })
        ));
    }

    #[test]
    fn increment_is_atomic_under_concurrent_callers() {
        let store = Arc::new(VariableStore::new());

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .increment(Scope::Global, Owner::None, "n", 1.0)
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(
            store.get(Scope::Global, Owner::None, "n"),
            Some(DataValue::Number(100.0))
        );
    }

    #[test]
    fn clear_only_touches_the_given_owner() {
        let store = VariableStore::new();
        let pass = Owner::Invocation(InvocationId(1));
        let other = Owner::Invocation(InvocationId(2));
        store.set(Scope::Local, pass, "a", DataValue::Number(1.0)).unwrap();
        store.set(Scope::Local, other, "a", DataValue::Number(2.0)).unwrap();

        store.clear(Scope::Local, pass);

        assert_eq!(store.get(Scope::Local, pass, "a"), None);
        assert_eq!(store.get(Scope::Local, other, "a"), Some(DataValue::Number(2.0)));
    }

    #[test]
    fn dynamic_suppliers_run_on_every_read() {
        let store = VariableStore::new();
        let counter = Arc::new(AtomicU64::new(0));
        let supplier_counter = Arc::clone(&counter);
        store.register_dynamic("tick", move || {
            DataValue::Number(supplier_counter.fetch_add(1, Ordering::SeqCst) as f64)
        });

        assert_eq!(
            store.get(Scope::Dynamic, Owner::None, "tick"),
            Some(DataValue::Number(0.0))
        );
        assert_eq!(
            store.get(Scope::Dynamic, Owner::None, "tick"),
            Some(DataValue::Number(1.0))
        );

        assert!(matches!(
            store.set(Scope::Dynamic, Owner::None, "tick", DataValue::Number(0.0)),
            Err(VariableError::DynamicNotWritable { .. })
        ));

        store.unregister_dynamic("tick");
        assert_eq!(store.get(Scope::Dynamic, Owner::None, "tick"), None);
    }

    #[test]
    fn persistent_round_trip() {
        let store = VariableStore::new();
        store
            .set(Scope::Persistent, Owner::None, "visits", DataValue::Number(9.0))
            .unwrap();
        store
            .set(Scope::Global, Owner::None, "transient", DataValue::Number(1.0))
            .unwrap();

        let snapshot = store.persistent_entries();
        assert_eq!(snapshot, vec![("visits".to_string(), DataValue::Number(9.0))]);

        let restored = VariableStore::new();
        restored.load_persistent(snapshot);
        assert_eq!(
            restored.get(Scope::Persistent, Owner::None, "visits"),
            Some(DataValue::Number(9.0))
        );
    }
}
