//! Argument extraction and the typed run-time argument view.
//!
//! Extraction is a pure, non-throwing mapping from a block's configuration
//! (inline parameters plus container slots) to optional values. Handlers see
//! the resolved form through [`ResolvedArgs`] and never touch raw blocks.

use crate::block::CodeBlock;
use crate::env::SlotStore;
use crate::error::ResolutionError;
use crate::value::{DataValue, ItemStack, Location, PlayerId, ValueType};

/// One pre-extracted argument as stored in compiled lines.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawArgument {
    pub name: String,
    pub value: DataValue,
}

impl RawArgument {
    pub fn new(name: impl Into<String>, value: DataValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Declared argument of a handler: a parameter name plus the expected type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    name: String,
    expected: ValueType,
}

impl Argument {
    pub fn new(name: impl Into<String>, expected: ValueType) -> Self {
        Self {
            name: name.into(),
            expected,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pulls this argument from a block's configuration.
    ///
    /// Inline parameters win over slots of the same name. Absence or a
    /// type-incompatible raw value is `None`; text is always usable since it
    /// may hold a placeholder that resolves to the expected type later.
    pub fn extract(&self, block: &CodeBlock, slots: &dyn SlotStore) -> Option<DataValue> {
        let value = match block.parameters.get(&self.name) {
            Some(value) => value.clone(),
            None => slots.slot(&block.anchor, &self.name)?.into_value()?,
        };

        if self.expected == ValueType::Any
            || value.kind() == self.expected
            || value.kind() == ValueType::Text
        {
            Some(value)
        } else {
            None
        }
    }
}

/// Gathers every inline parameter and named slot of a block.
///
/// Order is deterministic for idempotent compilation: parameters in name
/// order first, then slots in store order. A slot whose name collides with
/// an inline parameter is dropped.
pub fn extract_all(block: &CodeBlock, slots: &dyn SlotStore) -> Vec<RawArgument> {
    let mut arguments: Vec<RawArgument> = block
        .parameters
        .iter()
        .map(|(name, value)| RawArgument::new(name.clone(), value.clone()))
        .collect();

    for slot in slots.named_slots(&block.anchor) {
        if block.parameters.contains_key(&slot.name) {
            continue;
        }
        if let Some(value) = slot.content.into_value() {
            arguments.push(RawArgument::new(slot.name, value));
        }
    }

    arguments
}

/// Resolved arguments handed to a handler for one dispatch.
///
/// Typed getters perform the final conversion so that a NUMBER argument
/// backed by a placeholder resolves and then re-parses.
#[derive(Clone, Debug, Default)]
pub struct ResolvedArgs {
    values: Vec<RawArgument>,
}

impl ResolvedArgs {
    pub fn new(values: Vec<RawArgument>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.values
            .iter()
            .find(|argument| argument.name == name)
            .map(|argument| &argument.value)
    }

    fn require(&self, name: &str) -> Result<&DataValue, ResolutionError> {
        self.get(name).ok_or_else(|| ResolutionError::MissingArgument {
            argument: name.to_string(),
        })
    }

    pub fn text(&self, name: &str) -> Result<String, ResolutionError> {
        Ok(self.require(name)?.as_text())
    }

    pub fn number(&self, name: &str) -> Result<f64, ResolutionError> {
        self.require(name)?.as_number()
    }

    pub fn boolean(&self, name: &str) -> Result<bool, ResolutionError> {
        self.require(name)?.as_boolean()
    }

    pub fn location(&self, name: &str) -> Result<Location, ResolutionError> {
        self.require(name)?.as_location()
    }

    pub fn item(&self, name: &str) -> Result<ItemStack, ResolutionError> {
        self.require(name)?.as_item()
    }

    pub fn player(&self, name: &str) -> Result<PlayerId, ResolutionError> {
        self.require(name)?.as_player()
    }
}
