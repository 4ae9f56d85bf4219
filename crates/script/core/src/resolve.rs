//! Placeholder resolution.
//!
//! Text values are scanned for `%token%` placeholders. A token whose first
//! dot-separated segment names a scope is a qualified lookup; any other token
//! walks the bare-name fallback chain PLAYER → LOCAL → GLOBAL → SERVER.
//! PERSISTENT and DYNAMIC are only reachable through qualification.
//!
//! Unresolved placeholders stay in the output as literal `%token%` text so
//! authors can see exactly which reference failed; silent deletion would hide
//! the mistake.

use std::str::FromStr;

use crate::context::ExecutionContext;
use crate::value::{DataValue, RawArgument, ResolvedArgs};
use crate::vars::{Owner, Scope, VariableStore};

/// Bare names fall back through these scopes, first match wins.
const FALLBACK_CHAIN: [Scope; 4] = [Scope::Player, Scope::Local, Scope::Global, Scope::Server];

/// Expands placeholders against an execution context and variable store.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueResolver;

impl ValueResolver {
    pub fn new() -> Self {
        Self
    }

    /// Produces the fully resolved form of a value.
    ///
    /// TEXT is expanded; every other kind passes through structurally.
    pub fn resolve(
        &self,
        ctx: &ExecutionContext,
        store: &VariableStore,
        value: &DataValue,
    ) -> DataValue {
        match value {
            DataValue::Text(raw) => DataValue::Text(self.expand(ctx, store, raw)),
            other => other.clone(),
        }
    }

    /// Resolves a compiled argument list into the view handlers consume.
    pub fn resolve_args(
        &self,
        ctx: &ExecutionContext,
        store: &VariableStore,
        raw: &[RawArgument],
    ) -> ResolvedArgs {
        ResolvedArgs::new(
            raw.iter()
                .map(|argument| RawArgument {
                    name: argument.name.clone(),
                    value: self.resolve(ctx, store, &argument.value),
                })
                .collect(),
        )
    }

    /// Expands every `%token%` in `raw`. `%%` escapes a literal percent; an
    /// unterminated `%` is kept as-is.
    fn expand(&self, ctx: &ExecutionContext, store: &VariableStore, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;

        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            if let Some(stripped) = after.strip_prefix('%') {
                out.push('%');
                rest = stripped;
                continue;
            }

            match after.find('%') {
                Some(end) => {
                    let token = &after[..end];
                    match self.lookup(ctx, store, token) {
                        Some(value) => out.push_str(&value.as_text()),
                        None => {
                            out.push('%');
                            out.push_str(token);
                            out.push('%');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push('%');
                    out.push_str(after);
                    rest = "";
                }
            }
        }

        out.push_str(rest);
        out
    }

    fn lookup(
        &self,
        ctx: &ExecutionContext,
        store: &VariableStore,
        token: &str,
    ) -> Option<DataValue> {
        // Context tokens resolve before any variable scope.
        match token {
            "player" => return ctx.player.map(DataValue::Player),
            "location" => return ctx.location.clone().map(DataValue::Location),
            "event" => return Some(DataValue::text(ctx.event.to_string())),
            _ => {}
        }

        if let Some((prefix, name)) = token.split_once('.')
            && let Ok(scope) = Scope::from_str(prefix)
        {
            return store.get(scope, self.owner_for(ctx, scope)?, name);
        }

        for scope in FALLBACK_CHAIN {
            let Some(owner) = self.owner_for(ctx, scope) else {
                continue;
            };
            if let Some(value) = store.get(scope, owner, token) {
                return Some(value);
            }
        }
        None
    }

    /// Owner a scope lookup uses in this context; `None` when the scope
    /// needs a player and the context has none.
    fn owner_for(&self, ctx: &ExecutionContext, scope: Scope) -> Option<Owner> {
        match scope {
            Scope::Player => ctx.player.map(Owner::Player),
            Scope::Local => Some(Owner::Invocation(ctx.invocation)),
            _ => Some(Owner::None),
        }
    }
}
