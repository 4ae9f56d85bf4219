//! Authored program units before compilation.

use std::collections::BTreeMap;
use std::fmt;

use crate::env::BlockRef;
use crate::value::DataValue;

/// Identifier of an action or condition handler.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ActionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Visual class of an authored block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockKind {
    /// Starts a line and names the trigger event.
    Event,
    /// Dispatches to an action handler.
    Action,
    /// Opens an IF branch via a condition handler.
    Condition,
    /// Flips the current IF branch.
    Else,
    /// Closes the innermost IF.
    EndIf,
}

/// One authored unit: an event marker, action, condition, or bracket.
///
/// Parameters use a `BTreeMap` so compilation walks them in a deterministic
/// order regardless of insertion sequence.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeBlock {
    pub anchor: BlockRef,
    pub kind: BlockKind,
    pub action: ActionId,
    pub parameters: BTreeMap<String, DataValue>,
}

impl CodeBlock {
    pub fn new(anchor: BlockRef, kind: BlockKind, action: impl Into<ActionId>) -> Self {
        Self {
            anchor,
            kind,
            action: action.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Event marker carrying the trigger name as its action id.
    pub fn event(anchor: BlockRef, event: impl Into<String>) -> Self {
        Self::new(anchor, BlockKind::Event, ActionId::new(event))
    }

    pub fn action(anchor: BlockRef, id: impl Into<ActionId>) -> Self {
        Self::new(anchor, BlockKind::Action, id)
    }

    pub fn condition(anchor: BlockRef, id: impl Into<ActionId>) -> Self {
        Self::new(anchor, BlockKind::Condition, id)
    }

    pub fn else_bracket(anchor: BlockRef) -> Self {
        Self::new(anchor, BlockKind::Else, ActionId::new("else"))
    }

    pub fn end_if_bracket(anchor: BlockRef) -> Self {
        Self::new(anchor, BlockKind::EndIf, ActionId::new("end_if"))
    }

    /// Attaches an inline parameter (builder pattern).
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: DataValue) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }
}
