//! Built-in actions over the world sink and variable store.

use std::str::FromStr;
use std::sync::Arc;

use script_core::{
    ActionHandler, ExecutionContext, ExecutionResult, ResolvedArgs, Scope, VariableStore,
};

use super::{owner_for, require_player};
use crate::world::WorldSink;

/// `send_message` — sends `message` to the triggering player.
pub struct SendMessage {
    world: Arc<dyn WorldSink>,
}

impl SendMessage {
    pub fn new(world: Arc<dyn WorldSink>) -> Self {
        Self { world }
    }
}

impl ActionHandler for SendMessage {
    fn id(&self) -> &str {
        "send_message"
    }

    fn execute(&self, ctx: &ExecutionContext, args: &ResolvedArgs) -> ExecutionResult {
        let player = match require_player(ctx) {
            Ok(player) => player,
            Err(message) => return ExecutionResult::error(message),
        };
        match args.text("message") {
            Ok(message) => {
                self.world.send_message(player, &message);
                ExecutionResult::success()
            }
            Err(error) => ExecutionResult::error(error.to_string()),
        }
    }
}

/// `broadcast` — sends `message` to every player.
pub struct Broadcast {
    world: Arc<dyn WorldSink>,
}

impl Broadcast {
    pub fn new(world: Arc<dyn WorldSink>) -> Self {
        Self { world }
    }
}

impl ActionHandler for Broadcast {
    fn id(&self) -> &str {
        "broadcast"
    }

    fn execute(&self, _ctx: &ExecutionContext, args: &ResolvedArgs) -> ExecutionResult {
        match args.text("message") {
            Ok(message) => {
                self.world.broadcast(&message);
                ExecutionResult::success()
            }
            Err(error) => ExecutionResult::error(error.to_string()),
        }
    }
}

/// `teleport` — moves the triggering player to `destination`.
pub struct Teleport {
    world: Arc<dyn WorldSink>,
}

impl Teleport {
    pub fn new(world: Arc<dyn WorldSink>) -> Self {
        Self { world }
    }
}

impl ActionHandler for Teleport {
    fn id(&self) -> &str {
        "teleport"
    }

    fn execute(&self, ctx: &ExecutionContext, args: &ResolvedArgs) -> ExecutionResult {
        let player = match require_player(ctx) {
            Ok(player) => player,
            Err(message) => return ExecutionResult::error(message),
        };
        match args.location("destination") {
            Ok(destination) => {
                self.world.teleport(player, &destination);
                ExecutionResult::success()
            }
            Err(error) => ExecutionResult::error(error.to_string()),
        }
    }
}

/// `give_item` — gives `item` to the triggering player.
pub struct GiveItem {
    world: Arc<dyn WorldSink>,
}

impl GiveItem {
    pub fn new(world: Arc<dyn WorldSink>) -> Self {
        Self { world }
    }
}

impl ActionHandler for GiveItem {
    fn id(&self) -> &str {
        "give_item"
    }

    fn execute(&self, ctx: &ExecutionContext, args: &ResolvedArgs) -> ExecutionResult {
        let player = match require_player(ctx) {
            Ok(player) => player,
            Err(message) => return ExecutionResult::error(message),
        };
        match args.item("item") {
            Ok(item) => {
                self.world.give_item(player, &item);
                ExecutionResult::success()
            }
            Err(error) => ExecutionResult::error(error.to_string()),
        }
    }
}

/// `set_block` — places `material` at `location`.
pub struct SetBlock {
    world: Arc<dyn WorldSink>,
}

impl SetBlock {
    pub fn new(world: Arc<dyn WorldSink>) -> Self {
        Self { world }
    }
}

impl ActionHandler for SetBlock {
    fn id(&self) -> &str {
        "set_block"
    }

    fn execute(&self, _ctx: &ExecutionContext, args: &ResolvedArgs) -> ExecutionResult {
        let location = match args.location("location") {
            Ok(location) => location,
            Err(error) => return ExecutionResult::error(error.to_string()),
        };
        match args.text("material") {
            Ok(material) => {
                self.world.set_block(&location, &material);
                ExecutionResult::success()
            }
            Err(error) => ExecutionResult::error(error.to_string()),
        }
    }
}

/// `create_explosion` — detonates at `location` with optional `power`.
pub struct CreateExplosion {
    world: Arc<dyn WorldSink>,
}

impl CreateExplosion {
    pub fn new(world: Arc<dyn WorldSink>) -> Self {
        Self { world }
    }
}

impl ActionHandler for CreateExplosion {
    fn id(&self) -> &str {
        "create_explosion"
    }

    fn execute(&self, _ctx: &ExecutionContext, args: &ResolvedArgs) -> ExecutionResult {
        let location = match args.location("location") {
            Ok(location) => location,
            Err(error) => return ExecutionResult::error(error.to_string()),
        };
        let power = match args.get("power") {
            None => 4.0,
            Some(_) => match args.number("power") {
                Ok(power) => power,
                Err(error) => return ExecutionResult::error(error.to_string()),
            },
        };
        self.world.create_explosion(&location, power as f32);
        ExecutionResult::success()
    }
}

/// `set_variable` — writes `value` under `name` in `scope` (default global).
pub struct SetVariable {
    variables: Arc<VariableStore>,
}

impl SetVariable {
    pub fn new(variables: Arc<VariableStore>) -> Self {
        Self { variables }
    }
}

impl ActionHandler for SetVariable {
    fn id(&self) -> &str {
        "set_variable"
    }

    fn execute(&self, ctx: &ExecutionContext, args: &ResolvedArgs) -> ExecutionResult {
        let (scope, owner) = match scope_of(ctx, args) {
            Ok(pair) => pair,
            Err(message) => return ExecutionResult::error(message),
        };
        let name = match args.text("name") {
            Ok(name) => name,
            Err(error) => return ExecutionResult::error(error.to_string()),
        };
        let Some(value) = args.get("value") else {
            return ExecutionResult::error("missing argument `value`");
        };

        match self.variables.set(scope, owner, &name, value.clone()) {
            Ok(()) => ExecutionResult::success(),
            Err(error) => ExecutionResult::error(error.to_string()),
        }
    }
}

/// `increment_variable` — adds `delta` (default 1) to `name` in `scope`.
pub struct IncrementVariable {
    variables: Arc<VariableStore>,
}

impl IncrementVariable {
    pub fn new(variables: Arc<VariableStore>) -> Self {
        Self { variables }
    }
}

impl ActionHandler for IncrementVariable {
    fn id(&self) -> &str {
        "increment_variable"
    }

    fn execute(&self, ctx: &ExecutionContext, args: &ResolvedArgs) -> ExecutionResult {
        let (scope, owner) = match scope_of(ctx, args) {
            Ok(pair) => pair,
            Err(message) => return ExecutionResult::error(message),
        };
        let name = match args.text("name") {
            Ok(name) => name,
            Err(error) => return ExecutionResult::error(error.to_string()),
        };
        let delta = match args.get("delta") {
            None => 1.0,
            Some(_) => match args.number("delta") {
                Ok(delta) => delta,
                Err(error) => return ExecutionResult::error(error.to_string()),
            },
        };

        match self.variables.increment(scope, owner, &name, delta) {
            Ok(_) => ExecutionResult::success(),
            Err(error) => ExecutionResult::error(error.to_string()),
        }
    }
}

/// Reads the `scope` argument (default global) and derives its owner.
fn scope_of(
    ctx: &ExecutionContext,
    args: &ResolvedArgs,
) -> Result<(Scope, script_core::Owner), String> {
    let scope = match args.get("scope") {
        None => Scope::Global,
        Some(value) => {
            let raw = value.as_text();
            Scope::from_str(&raw).map_err(|_| format!("unknown scope `{raw}`"))?
        }
    };
    let owner = owner_for(ctx, scope)
        .ok_or_else(|| format!("scope `{scope}` needs a triggering player"))?;
    Ok((scope, owner))
}
