//! Event types for different topics.

use serde::{Deserialize, Serialize};

use script_core::{EventKind, Location, PlayerId};

/// A host event that may trigger script lines.
///
/// Carries just enough to build an execution context; anything richer stays
/// behind the collaborator traits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub kind: EventKind,
    pub player: Option<PlayerId>,
    pub location: Option<Location>,
}

impl TriggerEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            player: None,
            location: None,
        }
    }

    /// Attaches the triggering player (builder pattern).
    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Attaches the triggering location (builder pattern).
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// Script lifecycle events published by the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScriptEvent {
    /// A script was (re)compiled and swapped into the live cache.
    Compiled {
        script: String,
        line_count: usize,
        diagnostic_count: usize,
    },

    /// A line was cut short by a control-flow error or the step budget.
    LineAborted { script: String, event: EventKind },
}
