//! Compilation of authored block rows into a [`CodeScript`].
//!
//! Compilation runs on demand (the explicit "save code" trigger, not on
//! every mutation) and is pure: identical input rows produce structurally
//! equal scripts, diagnostics included. Problems become diagnostics on the
//! script; a bad block never aborts the rest of the compile.

use std::str::FromStr;

use crate::block::{BlockKind, CodeBlock};
use crate::env::SlotStore;
use crate::error::Diagnostic;
use crate::registry::{ActionRegistry, ConditionRegistry};
use crate::script::{ActionBlockData, CodeLine, CodeScript, EventKind, OpKind};
use crate::value::extract_all;

/// Walks authored rows and produces compiled scripts.
///
/// Borrows the registries only to validate identifiers; the compiled output
/// carries ids, not handler references.
pub struct ScriptCompiler<'r> {
    actions: &'r ActionRegistry,
    conditions: &'r ConditionRegistry,
}

impl<'r> ScriptCompiler<'r> {
    pub fn new(actions: &'r ActionRegistry, conditions: &'r ConditionRegistry) -> Self {
        Self {
            actions,
            conditions,
        }
    }

    /// Compiles rows of blocks into a script.
    ///
    /// Flow per row:
    /// 1. The first block must be an event marker naming a known trigger;
    ///    otherwise one diagnostic and the row is skipped.
    /// 2. Remaining blocks map to [`ActionBlockData`] in declared order.
    /// 3. Unknown action/condition identifiers produce one diagnostic each
    ///    and are omitted; the rest of the line still compiles.
    /// 4. Arguments are pre-extracted through the slot store.
    ///
    /// A row with an event and zero actions compiles to a legal, inert line.
    pub fn compile(
        &self,
        name: impl Into<String>,
        rows: &[Vec<CodeBlock>],
        slots: &dyn SlotStore,
    ) -> CodeScript {
        let name = name.into();
        let mut lines = Vec::new();
        let mut diagnostics = Vec::new();

        for (row_index, row) in rows.iter().enumerate() {
            let Some((head, tail)) = row.split_first() else {
                continue;
            };

            if head.kind != BlockKind::Event {
                diagnostics.push(Diagnostic::error(format!(
                    "row {row_index}: line must start with an event block"
                )));
                continue;
            }
            let Ok(event) = EventKind::from_str(head.action.as_str()) else {
                diagnostics.push(Diagnostic::error(format!(
                    "row {row_index}: unknown event `{}`",
                    head.action
                )));
                continue;
            };

            let mut actions = Vec::new();
            for block in tail {
                match self.compile_block(block, row_index, &mut diagnostics) {
                    Some(action) => actions.push(action),
                    None => continue,
                }
            }

            lines.push(CodeLine::new(
                event,
                actions
                    .into_iter()
                    .map(|(op, block)| {
                        ActionBlockData::new(op, block.action.clone(), extract_all(block, slots))
                    })
                    .collect(),
            ));
        }

        tracing::debug!(
            target: "script_core::compile",
            script = %name,
            lines = lines.len(),
            diagnostics = diagnostics.len(),
            "compiled"
        );

        CodeScript::new(name, lines, diagnostics)
    }

    /// Classifies one non-event block, validating its identifier against the
    /// registries.
    fn compile_block<'b>(
        &self,
        block: &'b CodeBlock,
        row_index: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<(OpKind, &'b CodeBlock)> {
        match block.kind {
            BlockKind::Event => {
                diagnostics.push(Diagnostic::error(format!(
                    "row {row_index}: event block `{}` in the middle of a line",
                    block.action
                )));
                None
            }
            BlockKind::Else => Some((OpKind::Else, block)),
            BlockKind::EndIf => Some((OpKind::EndIf, block)),
            BlockKind::Condition => {
                if self.conditions.contains(&block.action) {
                    Some((OpKind::Condition, block))
                } else {
                    diagnostics.push(Diagnostic::error(format!(
                        "row {row_index}: unknown condition `{}`",
                        block.action
                    )));
                    None
                }
            }
            BlockKind::Action => {
                if self.actions.contains(&block.action) {
                    Some((OpKind::Action, block))
                } else {
                    diagnostics.push(Diagnostic::error(format!(
                        "row {row_index}: unknown action `{}`",
                        block.action
                    )));
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;
    use crate::env::{BlockRef, NoSlots};
    use crate::error::{ResolutionError, Severity};
    use crate::registry::{ActionHandler, ConditionHandler, ExecutionResult};
    use crate::value::ResolvedArgs;
    use std::sync::Arc;

    struct Noop(&'static str);

    impl ActionHandler for Noop {
        fn id(&self) -> &str {
            self.0
        }

        fn execute(&self, _ctx: &ExecutionContext, _args: &ResolvedArgs) -> ExecutionResult {
            ExecutionResult::success()
        }
    }

    struct Always(&'static str);

    impl ConditionHandler for Always {
        fn id(&self) -> &str {
            self.0
        }

        fn evaluate(
            &self,
            _ctx: &ExecutionContext,
            _args: &ResolvedArgs,
        ) -> Result<bool, ResolutionError> {
            Ok(true)
        }
    }

    fn registries() -> (ActionRegistry, ConditionRegistry) {
        let mut actions = ActionRegistry::new();
        actions.register(Arc::new(Noop("send_message")));
        let mut conditions = ConditionRegistry::new();
        conditions.register(Arc::new(Always("if_has_permission")));
        (actions, conditions)
    }

    fn rows() -> Vec<Vec<CodeBlock>> {
        vec![vec![
            CodeBlock::event(BlockRef(0), "player_join"),
            CodeBlock::condition(BlockRef(1), "if_has_permission")
                .with_parameter("permission", crate::value::DataValue::text("vip")),
            CodeBlock::action(BlockRef(2), "send_message")
                .with_parameter("message", crate::value::DataValue::text("hi")),
            CodeBlock::end_if_bracket(BlockRef(3)),
        ]]
    }

    #[test]
    fn compiles_events_conditions_and_brackets() {
        let (actions, conditions) = registries();
        let script = ScriptCompiler::new(&actions, &conditions).compile("spawn", &rows(), &NoSlots);

        assert!(script.diagnostics.is_empty());
        assert_eq!(script.lines.len(), 1);
        let line = &script.lines[0];
        assert_eq!(line.event, EventKind::PlayerJoin);
        let ops: Vec<OpKind> = line.actions.iter().map(|a| a.op).collect();
        assert_eq!(ops, vec![OpKind::Condition, OpKind::Action, OpKind::EndIf]);
        assert_eq!(line.actions[0].arguments[0].name, "permission");
    }

    #[test]
    fn compilation_is_idempotent() {
        let (actions, conditions) = registries();
        let compiler = ScriptCompiler::new(&actions, &conditions);
        let rows = rows();
        assert_eq!(
            compiler.compile("spawn", &rows, &NoSlots),
            compiler.compile("spawn", &rows, &NoSlots)
        );
    }

    #[test]
    fn unknown_identifiers_become_diagnostics_not_failures() {
        let (actions, conditions) = registries();
        let rows = vec![vec![
            CodeBlock::event(BlockRef(0), "player_join"),
            CodeBlock::action(BlockRef(1), "summon_dragon"),
            CodeBlock::action(BlockRef(2), "send_message"),
        ]];
        let script = ScriptCompiler::new(&actions, &conditions).compile("x", &rows, &NoSlots);

        assert_eq!(script.diagnostics.len(), 1);
        assert_eq!(script.diagnostics[0].severity, Severity::Error);
        assert!(script.diagnostics[0].message.contains("summon_dragon"));
        // The known action still compiled.
        assert_eq!(script.lines[0].actions.len(), 1);
    }

    #[test]
    fn unknown_event_skips_the_row() {
        let (actions, conditions) = registries();
        let rows = vec![
            vec![CodeBlock::event(BlockRef(0), "meteor_strike")],
            vec![CodeBlock::event(BlockRef(1), "player_quit")],
        ];
        let script = ScriptCompiler::new(&actions, &conditions).compile("x", &rows, &NoSlots);

        assert_eq!(script.lines.len(), 1);
        assert_eq!(script.lines[0].event, EventKind::PlayerQuit);
        assert_eq!(script.diagnostics.len(), 1);
    }

    #[test]
    fn zero_action_line_is_legal() {
        let (actions, conditions) = registries();
        let rows = vec![vec![CodeBlock::event(BlockRef(0), "block_break")]];
        let script = ScriptCompiler::new(&actions, &conditions).compile("x", &rows, &NoSlots);

        assert!(script.diagnostics.is_empty());
        assert_eq!(script.lines[0].actions.len(), 0);
    }
}
