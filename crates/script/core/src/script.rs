//! Compiled program model.
//!
//! A [`CodeScript`] is the persisted output of compilation: ordered lines,
//! each binding one trigger event to an ordered action list. Scripts are
//! read-only after compilation and safe to share across concurrent trigger
//! evaluations.

use crate::block::ActionId;
use crate::error::Diagnostic;
use crate::value::RawArgument;

/// Trigger events a line can bind to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EventKind {
    PlayerJoin,
    PlayerQuit,
    PlayerChat,
    PlayerMove,
    PlayerInteract,
    PlayerDeath,
    PlayerRespawn,
    BlockBreak,
    BlockPlace,
}

/// Operation class of a compiled action, decided once at compile time so the
/// interpreter never re-inspects block kinds or identifier spellings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpKind {
    Condition,
    Else,
    EndIf,
    Action,
}

/// One compiled action with its pre-extracted arguments. Immutable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionBlockData {
    pub op: OpKind,
    pub action: ActionId,
    pub arguments: Vec<RawArgument>,
}

impl ActionBlockData {
    pub fn new(op: OpKind, action: impl Into<ActionId>, arguments: Vec<RawArgument>) -> Self {
        Self {
            op,
            action: action.into(),
            arguments,
        }
    }
}

/// One trigger-to-actions mapping.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeLine {
    pub event: EventKind,
    pub actions: Vec<ActionBlockData>,
}

impl CodeLine {
    pub fn new(event: EventKind, actions: Vec<ActionBlockData>) -> Self {
        Self { event, actions }
    }
}

/// The full compiled program for one authoring context.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeScript {
    pub name: String,
    pub enabled: bool,
    pub lines: Vec<CodeLine>,
    /// Compile-time record; unknown identifiers land here instead of failing
    /// the whole compile.
    pub diagnostics: Vec<Diagnostic>,
}

impl CodeScript {
    pub fn new(name: impl Into<String>, lines: Vec<CodeLine>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            lines,
            diagnostics,
        }
    }

    /// Lines bound to `event`; empty when the script is disabled.
    pub fn matching_lines(&self, event: EventKind) -> impl Iterator<Item = &CodeLine> {
        self.lines
            .iter()
            .filter(move |line| self.enabled && line.event == event)
    }
}
