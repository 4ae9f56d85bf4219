//! Per-trigger execution state.

use crate::block::ActionId;
use crate::script::EventKind;
use crate::value::{Location, PlayerId};
use crate::vars::InvocationId;

/// Runtime state scoped to a single execution pass.
///
/// Created fresh per triggering event and discarded when the pass completes;
/// only variables written through the store outlive it.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    pub event: EventKind,
    pub player: Option<PlayerId>,
    pub location: Option<Location>,
    /// Keys the LOCAL variable scope for this pass.
    pub invocation: InvocationId,
    /// Action currently being dispatched, for diagnostics.
    pub current_block: Option<ActionId>,
}

impl ExecutionContext {
    pub fn new(event: EventKind, invocation: InvocationId) -> Self {
        Self {
            event,
            player: None,
            location: None,
            invocation,
            current_block: None,
        }
    }

    /// Attaches the triggering player (builder pattern).
    #[must_use]
    pub fn with_player(mut self, player: Option<PlayerId>) -> Self {
        self.player = player;
        self
    }

    /// Attaches the triggering location (builder pattern).
    #[must_use]
    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }
}
