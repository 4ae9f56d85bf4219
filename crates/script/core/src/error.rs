//! Error and diagnostic infrastructure for the engine.
//!
//! Expected failures are data, not panics: resolution problems abort a single
//! action, control-flow problems abort a single line, and compile problems
//! become [`Diagnostic`]s attached to the script. Nothing in this crate
//! unwinds across the interpreter loop.

use crate::value::{PlayerId, ValueType};

/// Severity of a reported diagnostic.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A compile-time or run-time report surfaced to the host.
///
/// The engine never decides *how* a diagnostic is shown; it hands the tuple
/// to a [`DiagnosticSink`] and moves on. Compile diagnostics are additionally
/// recorded on the produced script so authors can inspect them later.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Player the report concerns, when there is one (the script author at
    /// compile time, the triggering player at run time).
    pub player: Option<PlayerId>,
}

impl Diagnostic {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            player: None,
        }
    }

    /// Attaches the concerned player (builder pattern).
    #[must_use]
    pub fn with_player(mut self, player: Option<PlayerId>) -> Self {
        self.player = player;
        self
    }
}

/// Destination for engine diagnostics.
///
/// Hosts decide whether reports end up in chat, a log file, or nowhere.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: &Diagnostic);
}

/// Sink that discards every diagnostic.
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _diagnostic: &Diagnostic) {}
}

/// Sink that forwards diagnostics to `tracing` at a matching level.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Info => tracing::info!(
                target: "script_core::diagnostics",
                player = ?diagnostic.player,
                "{}",
                diagnostic.message
            ),
            Severity::Warning => tracing::warn!(
                target: "script_core::diagnostics",
                player = ?diagnostic.player,
                "{}",
                diagnostic.message
            ),
            Severity::Error => tracing::error!(
                target: "script_core::diagnostics",
                player = ?diagnostic.player,
                "{}",
                diagnostic.message
            ),
        }
    }
}

/// A value or argument could not be produced with the required type.
///
/// Aborts only the single action or condition that needed the value; a
/// condition that fails to resolve evaluates to `false`.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ResolutionError {
    /// The handler asked for an argument the block does not carry.
    #[error("missing argument `{argument}`")]
    MissingArgument { argument: String },

    /// The value exists but has an incompatible type.
    #[error("expected {expected}, found {actual}")]
    TypeMismatch {
        expected: ValueType,
        actual: ValueType,
    },

    /// Text that should parse as a number does not.
    #[error("`{raw}` is not a number")]
    MalformedNumber { raw: String },

    /// Text that should parse as a location does not.
    #[error("`{raw}` is not a location")]
    MalformedLocation { raw: String },

    /// Text that should name a variable scope does not.
    #[error("`{raw}` is not a variable scope")]
    UnknownScope { raw: String },
}

/// ELSE or END IF encountered with no matching open IF.
///
/// Aborts the remainder of the current line only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ControlFlowError {
    #[error("ELSE without IF")]
    ElseWithoutIf,

    #[error("END IF without IF")]
    EndIfWithoutIf,
}

/// Invalid operation against the variable store.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum VariableError {
    /// DYNAMIC entries are computed by suppliers and cannot be written.
    #[error("dynamic variable `{name}` cannot be written")]
    DynamicNotWritable { name: String },

    /// `increment` found an existing value that does not coerce to a number.
    #[error("variable `{name}` holds a non-numeric value")]
    NotANumber { name: String },
}
