//! Diagnostic sinks that surface engine reports to players.

use std::sync::Arc;

use script_core::{Diagnostic, DiagnosticSink};

use crate::world::WorldSink;

/// Forwards diagnostics to the concerned player's chat; reports with no
/// player fall through to `tracing`.
///
/// This is the immediate-feedback path for script authors: compile and
/// control-flow problems show up where the triggering player can see them.
pub struct ChatSink {
    world: Arc<dyn WorldSink>,
}

impl ChatSink {
    pub fn new(world: Arc<dyn WorldSink>) -> Self {
        Self { world }
    }
}

impl DiagnosticSink for ChatSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        match diagnostic.player {
            Some(player) => {
                let message = format!("[script {}] {}", diagnostic.severity, diagnostic.message);
                self.world.send_message(player, &message);
            }
            None => tracing::warn!(
                target: "runtime::diagnostics",
                severity = %diagnostic.severity,
                "{}",
                diagnostic.message
            ),
        }
    }
}
