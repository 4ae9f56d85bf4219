//! Pure block-scripting engine shared across hosts.
//!
//! `script-core` defines the canonical model (values, blocks, compiled
//! scripts) and exposes pure APIs reused by the runtime and offline tools:
//! compilation through [`compile::ScriptCompiler`], placeholder resolution
//! through [`resolve::ValueResolver`], and interpretation through
//! [`interpret::ExecutionEngine`]. All side effects flow through the
//! collaborator traits in [`env`], [`error`], and [`registry`].
pub mod block;
pub mod compile;
pub mod context;
pub mod env;
pub mod error;
pub mod interpret;
pub mod registry;
pub mod resolve;
pub mod script;
pub mod value;
pub mod vars;

pub use block::{ActionId, BlockKind, CodeBlock};
pub use compile::ScriptCompiler;
pub use context::ExecutionContext;
pub use env::{BlockRef, NamedSlot, NoSlots, RawSlotContent, SlotStore};
pub use error::{
    ControlFlowError, Diagnostic, DiagnosticSink, NullSink, ResolutionError, Severity, TracingSink,
    VariableError,
};
pub use interpret::{ExecutionEngine, LineReport};
pub use registry::{
    ActionHandler, ActionRegistry, ConditionHandler, ConditionRegistry, ExecutionResult,
};
pub use resolve::ValueResolver;
pub use script::{ActionBlockData, CodeLine, CodeScript, EventKind, OpKind};
pub use value::{
    Argument, DataValue, ItemStack, Location, PlayerId, RawArgument, ResolvedArgs, ValueType,
    extract_all,
};
pub use vars::{InvocationId, Owner, Scope, VariableStore};
