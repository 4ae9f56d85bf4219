//! Built-in conditions over the player directory and variable store.

use std::str::FromStr;
use std::sync::Arc;

use script_core::{
    ConditionHandler, DataValue, ExecutionContext, ResolutionError, ResolvedArgs, Scope,
    VariableStore,
};

use super::owner_for;
use crate::world::PlayerDirectory;

/// `if_has_permission` — the triggering player holds `permission`.
///
/// No player in context evaluates to false rather than erroring; a line
/// authored against player events simply never takes the branch elsewhere.
pub struct IfHasPermission {
    players: Arc<dyn PlayerDirectory>,
}

impl IfHasPermission {
    pub fn new(players: Arc<dyn PlayerDirectory>) -> Self {
        Self { players }
    }
}

impl ConditionHandler for IfHasPermission {
    fn id(&self) -> &str {
        "if_has_permission"
    }

    fn evaluate(
        &self,
        ctx: &ExecutionContext,
        args: &ResolvedArgs,
    ) -> Result<bool, ResolutionError> {
        let permission = args.text("permission")?;
        Ok(ctx
            .player
            .is_some_and(|player| self.players.has_permission(player, &permission)))
    }
}

/// `if_player_online` — the triggering player is currently online.
pub struct IfPlayerOnline {
    players: Arc<dyn PlayerDirectory>,
}

impl IfPlayerOnline {
    pub fn new(players: Arc<dyn PlayerDirectory>) -> Self {
        Self { players }
    }
}

impl ConditionHandler for IfPlayerOnline {
    fn id(&self) -> &str {
        "if_player_online"
    }

    fn evaluate(
        &self,
        ctx: &ExecutionContext,
        _args: &ResolvedArgs,
    ) -> Result<bool, ResolutionError> {
        Ok(ctx.player.is_some_and(|player| self.players.is_online(player)))
    }
}

/// `if_variable_equals` — `name` in `scope` (default global) equals `value`.
///
/// Comparison is numeric when both sides parse as numbers, textual
/// otherwise, so `"3"` equals `3`.
pub struct IfVariableEquals {
    variables: Arc<VariableStore>,
}

impl IfVariableEquals {
    pub fn new(variables: Arc<VariableStore>) -> Self {
        Self { variables }
    }
}

impl ConditionHandler for IfVariableEquals {
    fn id(&self) -> &str {
        "if_variable_equals"
    }

    fn evaluate(
        &self,
        ctx: &ExecutionContext,
        args: &ResolvedArgs,
    ) -> Result<bool, ResolutionError> {
        let (scope, owner) = scope_of(ctx, args)?;
        let name = args.text("name")?;
        let expected = args
            .get("value")
            .ok_or_else(|| ResolutionError::MissingArgument {
                argument: "value".to_string(),
            })?;

        let Some(actual) = self.variables.get(scope, owner, &name) else {
            return Ok(false);
        };
        Ok(values_equal(&actual, expected))
    }
}

/// `if_variable_exists` — `name` in `scope` (default global) is set.
pub struct IfVariableExists {
    variables: Arc<VariableStore>,
}

impl IfVariableExists {
    pub fn new(variables: Arc<VariableStore>) -> Self {
        Self { variables }
    }
}

impl ConditionHandler for IfVariableExists {
    fn id(&self) -> &str {
        "if_variable_exists"
    }

    fn evaluate(
        &self,
        ctx: &ExecutionContext,
        args: &ResolvedArgs,
    ) -> Result<bool, ResolutionError> {
        let (scope, owner) = scope_of(ctx, args)?;
        let name = args.text("name")?;
        Ok(self.variables.get(scope, owner, &name).is_some())
    }
}

fn values_equal(actual: &DataValue, expected: &DataValue) -> bool {
    if let (Ok(a), Ok(b)) = (actual.as_number(), expected.as_number()) {
        return (a - b).abs() < f64::EPSILON;
    }
    actual.as_text() == expected.as_text()
}

fn scope_of(
    ctx: &ExecutionContext,
    args: &ResolvedArgs,
) -> Result<(Scope, script_core::Owner), ResolutionError> {
    let scope = match args.get("scope") {
        None => Scope::Global,
        Some(value) => {
            let raw = value.as_text();
            Scope::from_str(&raw).map_err(|_| ResolutionError::UnknownScope { raw })?
        }
    };
    // A player-scoped check with no player in context cannot match anything.
    let owner = owner_for(ctx, scope).unwrap_or(script_core::Owner::None);
    Ok((scope, owner))
}
