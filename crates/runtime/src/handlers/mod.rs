//! Built-in action and condition handlers.
//!
//! Each handler owns the collaborators it needs (world sink, player
//! directory, variable store), injected at construction. Business failures
//! are [`script_core::ExecutionResult::Error`] values; nothing here panics
//! or unwinds into the interpreter.

mod actions;
mod conditions;

pub use actions::{
    Broadcast, CreateExplosion, GiveItem, IncrementVariable, SendMessage, SetBlock, SetVariable,
    Teleport,
};
pub use conditions::{IfHasPermission, IfPlayerOnline, IfVariableEquals, IfVariableExists};

use std::sync::Arc;

use script_core::{
    ActionRegistry, ConditionRegistry, ExecutionContext, Owner, PlayerId, Scope, VariableStore,
};

use crate::world::{PlayerDirectory, WorldSink};

/// Registers the whole built-in handler set.
pub fn register_defaults(
    actions: &mut ActionRegistry,
    conditions: &mut ConditionRegistry,
    world: Arc<dyn WorldSink>,
    players: Arc<dyn PlayerDirectory>,
    variables: Arc<VariableStore>,
) {
    actions.register(Arc::new(SendMessage::new(Arc::clone(&world))));
    actions.register(Arc::new(Broadcast::new(Arc::clone(&world))));
    actions.register(Arc::new(Teleport::new(Arc::clone(&world))));
    actions.register(Arc::new(GiveItem::new(Arc::clone(&world))));
    actions.register(Arc::new(SetBlock::new(Arc::clone(&world))));
    actions.register(Arc::new(CreateExplosion::new(world)));
    actions.register(Arc::new(SetVariable::new(Arc::clone(&variables))));
    actions.register(Arc::new(IncrementVariable::new(Arc::clone(&variables))));

    conditions.register(Arc::new(IfHasPermission::new(Arc::clone(&players))));
    conditions.register(Arc::new(IfPlayerOnline::new(players)));
    conditions.register(Arc::new(IfVariableEquals::new(Arc::clone(&variables))));
    conditions.register(Arc::new(IfVariableExists::new(variables)));
}

/// Owner a variable-touching handler uses for a scope in this context.
fn owner_for(ctx: &ExecutionContext, scope: Scope) -> Option<Owner> {
    match scope {
        Scope::Player => ctx.player.map(Owner::Player),
        Scope::Local => Some(Owner::Invocation(ctx.invocation)),
        _ => Some(Owner::None),
    }
}

/// The triggering player, or a uniform business error message.
fn require_player(ctx: &ExecutionContext) -> Result<PlayerId, String> {
    ctx.player.ok_or_else(|| "no triggering player".to_string())
}
