//! Collaborator seams consumed by the engine.
//!
//! The engine never parses inventories, display names, or any other host
//! representation. Hosts hand it typed slot contents through [`SlotStore`]
//! and receive reports through [`crate::error::DiagnosticSink`].

use crate::value::DataValue;

/// Opaque handle tying a [`crate::block::CodeBlock`] to its authored
/// position. The host maps it back to world coordinates or container ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockRef(pub u64);

/// Raw content of one configuration slot, already stripped of host detail.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawSlotContent {
    Text(String),
    Item { material: String, amount: u32 },
    Empty,
}

impl RawSlotContent {
    /// Converts slot content into a value; empty slots carry nothing.
    pub fn into_value(self) -> Option<DataValue> {
        match self {
            Self::Text(s) => Some(DataValue::Text(s)),
            Self::Item { material, amount } => {
                Some(DataValue::Item(crate::value::ItemStack::new(material, amount)))
            }
            Self::Empty => None,
        }
    }
}

/// A slot paired with the parameter name the host assigned to it.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedSlot {
    pub name: String,
    pub content: RawSlotContent,
}

impl NamedSlot {
    pub fn new(name: impl Into<String>, content: RawSlotContent) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// Access to the named parameter slots attached to an authored block.
///
/// Implementations are expected to be cheap; the compiler queries each block
/// once per compile.
pub trait SlotStore {
    /// All named slots of a block, in the host's slot order.
    fn named_slots(&self, block: &BlockRef) -> Vec<NamedSlot>;

    /// A single slot by name.
    fn slot(&self, block: &BlockRef, name: &str) -> Option<RawSlotContent> {
        self.named_slots(block)
            .into_iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.content)
    }
}

/// Slot store for hosts without containers; every block has no slots.
pub struct NoSlots;

impl SlotStore for NoSlots {
    fn named_slots(&self, _block: &BlockRef) -> Vec<NamedSlot> {
        Vec::new()
    }
}
