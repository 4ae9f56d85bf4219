//! The control-flow interpreter.
//!
//! One [`ExecutionEngine`] interprets compiled lines against an execution
//! context. Per line it keeps a stack of open IF truth values and a `skip`
//! flag, processed strictly in compiled order:
//!
//! 1. Condition: evaluate, push the result, `skip = !result`.
//! 2. ELSE: peek the open IF and invert the branch; the stack is not popped.
//! 3. END IF: pop; `skip` reverts to reflect the new top of the stack.
//! 4. Anything else: dispatched unless `skip` is set.
//!
//! Errors never unwind past a line: a condition that fails to resolve is
//! `false`, a failing action is reported and the line continues, and an
//! unmatched ELSE/END IF aborts the current line only.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::ExecutionContext;
use crate::error::{ControlFlowError, Diagnostic, DiagnosticSink};
use crate::registry::{ActionRegistry, ConditionRegistry, ExecutionResult};
use crate::resolve::ValueResolver;
use crate::script::{CodeLine, CodeScript, EventKind, OpKind};
use crate::value::{Location, PlayerId};
use crate::vars::{InvocationId, Owner, Scope, VariableStore};

/// Outcome of interpreting one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineReport {
    /// Actions actually dispatched (conditions and brackets excluded).
    pub executed: usize,
    /// True when a control-flow error or the step budget cut the line short.
    pub aborted: bool,
}

/// Interprets compiled lines. Cheap to share; all state lives per call.
pub struct ExecutionEngine {
    actions: Arc<ActionRegistry>,
    conditions: Arc<ConditionRegistry>,
    variables: Arc<VariableStore>,
    diagnostics: Arc<dyn DiagnosticSink>,
    resolver: ValueResolver,
    /// Upper bound on processed actions per line; 0 disables the bound.
    max_actions_per_line: usize,
    invocations: AtomicU64,
}

impl ExecutionEngine {
    pub fn new(
        actions: Arc<ActionRegistry>,
        conditions: Arc<ConditionRegistry>,
        variables: Arc<VariableStore>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            actions,
            conditions,
            variables,
            diagnostics,
            resolver: ValueResolver::new(),
            max_actions_per_line: 1024,
            invocations: AtomicU64::new(0),
        }
    }

    /// Overrides the per-line step budget (builder pattern); 0 = unlimited.
    #[must_use]
    pub fn with_step_budget(mut self, max_actions_per_line: usize) -> Self {
        self.max_actions_per_line = max_actions_per_line;
        self
    }

    pub fn variables(&self) -> &Arc<VariableStore> {
        &self.variables
    }

    /// Runs every enabled line of `script` bound to `event`, each with a
    /// fresh invocation. One line's abort never affects its siblings.
    pub fn run_script(
        &self,
        script: &CodeScript,
        event: EventKind,
        player: Option<PlayerId>,
        location: Option<Location>,
    ) -> Vec<LineReport> {
        script
            .matching_lines(event)
            .map(|line| self.run_line_for(line, player, location.clone()))
            .collect()
    }

    /// Mints an invocation, builds the context, runs the line, and reaps its
    /// LOCAL variables.
    pub fn run_line_for(
        &self,
        line: &CodeLine,
        player: Option<PlayerId>,
        location: Option<Location>,
    ) -> LineReport {
        let invocation = InvocationId(self.invocations.fetch_add(1, Ordering::Relaxed));
        let mut ctx = ExecutionContext::new(line.event, invocation)
            .with_player(player)
            .with_location(location);

        let report = self.run_line(line, &mut ctx);
        self.variables.clear(Scope::Local, Owner::Invocation(invocation));
        report
    }

    /// Interprets one line against an existing context.
    pub fn run_line(&self, line: &CodeLine, ctx: &mut ExecutionContext) -> LineReport {
        let mut stack: Vec<bool> = Vec::new();
        let mut skip = false;
        let mut report = LineReport {
            executed: 0,
            aborted: false,
        };

        for (step, action) in line.actions.iter().enumerate() {
            if self.max_actions_per_line != 0 && step >= self.max_actions_per_line {
                self.emit(ctx, Diagnostic::error(format!(
                    "line for {} exceeded the step budget of {}",
                    line.event, self.max_actions_per_line
                )));
                report.aborted = true;
                break;
            }

            ctx.current_block = Some(action.action.clone());

            match action.op {
                OpKind::Condition => {
                    let result = self.evaluate_condition(ctx, action);
                    stack.push(result);
                    skip = !result;
                }
                OpKind::Else => {
                    let Some(last_condition) = stack.last().copied() else {
                        self.emit(ctx, Diagnostic::error(ControlFlowError::ElseWithoutIf.to_string()));
                        report.aborted = true;
                        break;
                    };
                    // ELSE shares its IF's level until END IF closes it.
                    skip = last_condition;
                }
                OpKind::EndIf => {
                    if stack.pop().is_none() {
                        self.emit(ctx, Diagnostic::error(ControlFlowError::EndIfWithoutIf.to_string()));
                        report.aborted = true;
                        break;
                    }
                    skip = stack.last().is_some_and(|top| !top);
                }
                OpKind::Action => {
                    if skip {
                        continue;
                    }
                    self.dispatch(ctx, action);
                    report.executed += 1;
                }
            }
        }

        ctx.current_block = None;
        report
    }

    /// Evaluates one condition. Resolution or handler failure is `false`
    /// with a warning, per the error design: a branch must always get a
    /// truth value.
    fn evaluate_condition(
        &self,
        ctx: &ExecutionContext,
        action: &crate::script::ActionBlockData,
    ) -> bool {
        let Some(handler) = self.conditions.get(&action.action) else {
            self.emit(
                ctx,
                Diagnostic::error(format!("unknown condition `{}`", action.action)),
            );
            return false;
        };

        let args = self
            .resolver
            .resolve_args(ctx, &self.variables, &action.arguments);
        match handler.evaluate(ctx, &args) {
            Ok(result) => result,
            Err(error) => {
                self.emit(
                    ctx,
                    Diagnostic::warning(format!("condition `{}`: {error}", action.action)),
                );
                false
            }
        }
    }

    fn dispatch(&self, ctx: &ExecutionContext, action: &crate::script::ActionBlockData) {
        let Some(handler) = self.actions.get(&action.action) else {
            self.emit(
                ctx,
                Diagnostic::error(format!("unknown action `{}`", action.action)),
            );
            return;
        };

        let args = self
            .resolver
            .resolve_args(ctx, &self.variables, &action.arguments);
        match handler.execute(ctx, &args) {
            ExecutionResult::Success => {}
            ExecutionResult::Error(message) => {
                self.emit(
                    ctx,
                    Diagnostic::warning(format!("action `{}`: {message}", action.action)),
                );
            }
        }
    }

    fn emit(&self, ctx: &ExecutionContext, diagnostic: Diagnostic) {
        self.diagnostics.emit(&diagnostic.with_player(ctx.player));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ResolutionError, Severity};
    use crate::registry::{ActionHandler, ConditionHandler};
    use crate::script::ActionBlockData;
    use crate::value::{DataValue, RawArgument, ResolvedArgs};
    use std::sync::Mutex;

    /// Records dispatched messages and emitted diagnostics for assertions.
    struct Recorder {
        messages: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                messages: Mutex::new(Vec::new()),
            })
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.messages.lock().unwrap())
        }
    }

    struct Say(Arc<Recorder>);

    impl ActionHandler for Say {
        fn id(&self) -> &str {
            "say"
        }

        fn execute(&self, _ctx: &ExecutionContext, args: &ResolvedArgs) -> ExecutionResult {
            match args.text("message") {
                Ok(message) => {
                    self.0.messages.lock().unwrap().push(message);
                    ExecutionResult::success()
                }
                Err(error) => ExecutionResult::error(error.to_string()),
            }
        }
    }

    /// Condition that reads its truth value from the `value` argument.
    struct Flag;

    impl ConditionHandler for Flag {
        fn id(&self) -> &str {
            "if_flag"
        }

        fn evaluate(
            &self,
            _ctx: &ExecutionContext,
            args: &ResolvedArgs,
        ) -> Result<bool, ResolutionError> {
            args.boolean("value")
        }
    }

    struct CountingSink(Mutex<Vec<Diagnostic>>);

    impl DiagnosticSink for CountingSink {
        fn emit(&self, diagnostic: &Diagnostic) {
            self.0.lock().unwrap().push(diagnostic.clone());
        }
    }

    fn engine_with(recorder: &Arc<Recorder>, sink: Arc<CountingSink>) -> ExecutionEngine {
        let mut actions = ActionRegistry::new();
        actions.register(Arc::new(Say(Arc::clone(recorder))));
        let mut conditions = ConditionRegistry::new();
        conditions.register(Arc::new(Flag));

        ExecutionEngine::new(
            Arc::new(actions),
            Arc::new(conditions),
            Arc::new(VariableStore::new()),
            sink,
        )
    }

    fn sink() -> Arc<CountingSink> {
        Arc::new(CountingSink(Mutex::new(Vec::new())))
    }

    fn condition(value: bool) -> ActionBlockData {
        ActionBlockData::new(
            OpKind::Condition,
            "if_flag",
            vec![RawArgument::new("value", DataValue::Boolean(value))],
        )
    }

    fn say(message: &str) -> ActionBlockData {
        ActionBlockData::new(
            OpKind::Action,
            "say",
            vec![RawArgument::new("message", DataValue::text(message))],
        )
    }

    fn else_op() -> ActionBlockData {
        ActionBlockData::new(OpKind::Else, "else", vec![])
    }

    fn end_if() -> ActionBlockData {
        ActionBlockData::new(OpKind::EndIf, "end_if", vec![])
    }

    #[test]
    fn else_complement_true_branch() {
        let recorder = Recorder::new();
        let engine = engine_with(&recorder, sink());
        let line = CodeLine::new(
            EventKind::PlayerJoin,
            vec![condition(true), say("then"), else_op(), say("otherwise"), end_if()],
        );

        let report = engine.run_line_for(&line, None, None);

        assert_eq!(recorder.take(), vec!["then"]);
        assert_eq!(report, LineReport { executed: 1, aborted: false });
    }

    #[test]
    fn else_complement_false_branch() {
        let recorder = Recorder::new();
        let engine = engine_with(&recorder, sink());
        let line = CodeLine::new(
            EventKind::PlayerJoin,
            vec![condition(false), say("then"), else_op(), say("otherwise"), end_if()],
        );

        engine.run_line_for(&line, None, None);

        assert_eq!(recorder.take(), vec!["otherwise"]);
    }

    #[test]
    fn balanced_line_ends_with_actions_after_the_block() {
        let recorder = Recorder::new();
        let engine = engine_with(&recorder, sink());
        let line = CodeLine::new(
            EventKind::PlayerJoin,
            vec![
                condition(false),
                say("inside"),
                end_if(),
                // Skip state reverts once the block closes.
                say("after"),
            ],
        );

        let report = engine.run_line_for(&line, None, None);

        assert_eq!(recorder.take(), vec!["after"]);
        assert!(!report.aborted);
    }

    #[test]
    fn unmatched_else_emits_one_error_and_aborts_the_line() {
        let recorder = Recorder::new();
        let diagnostics = sink();
        let engine = engine_with(&recorder, Arc::clone(&diagnostics));
        let line = CodeLine::new(
            EventKind::PlayerJoin,
            vec![else_op(), say("never")],
        );

        let report = engine.run_line_for(&line, None, None);

        assert!(recorder.take().is_empty());
        assert!(report.aborted);
        let emitted = diagnostics.0.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].message, "ELSE without IF");
    }

    #[test]
    fn unmatched_end_if_aborts_the_line() {
        let recorder = Recorder::new();
        let diagnostics = sink();
        let engine = engine_with(&recorder, Arc::clone(&diagnostics));
        let line = CodeLine::new(EventKind::PlayerJoin, vec![end_if(), say("never")]);

        let report = engine.run_line_for(&line, None, None);

        assert!(recorder.take().is_empty());
        assert!(report.aborted);
        assert_eq!(
            diagnostics.0.lock().unwrap()[0].message,
            "END IF without IF"
        );
    }

    #[test]
    fn nested_blocks_restore_outer_skip_on_close() {
        let recorder = Recorder::new();
        let engine = engine_with(&recorder, sink());
        let line = CodeLine::new(
            EventKind::PlayerJoin,
            vec![
                condition(true),
                condition(false),
                say("inner"),
                end_if(),
                say("outer"),
                end_if(),
                say("tail"),
            ],
        );

        engine.run_line_for(&line, None, None);

        assert_eq!(recorder.take(), vec!["outer", "tail"]);
    }

    #[test]
    fn condition_resolution_failure_is_false() {
        let recorder = Recorder::new();
        let diagnostics = sink();
        let engine = engine_with(&recorder, Arc::clone(&diagnostics));
        let bad_condition = ActionBlockData::new(
            OpKind::Condition,
            "if_flag",
            vec![RawArgument::new("value", DataValue::text("not-a-bool"))],
        );
        let line = CodeLine::new(
            EventKind::PlayerJoin,
            vec![bad_condition, say("then"), else_op(), say("otherwise"), end_if()],
        );

        engine.run_line_for(&line, None, None);

        assert_eq!(recorder.take(), vec!["otherwise"]);
        assert_eq!(diagnostics.0.lock().unwrap()[0].severity, Severity::Warning);
    }

    #[test]
    fn failing_action_does_not_stop_the_line() {
        let recorder = Recorder::new();
        let diagnostics = sink();
        let engine = engine_with(&recorder, Arc::clone(&diagnostics));
        let bad_action = ActionBlockData::new(OpKind::Action, "say", vec![]);
        let line = CodeLine::new(EventKind::PlayerJoin, vec![bad_action, say("still here")]);

        let report = engine.run_line_for(&line, None, None);

        assert_eq!(recorder.take(), vec!["still here"]);
        assert!(!report.aborted);
        assert_eq!(report.executed, 2);
        assert_eq!(diagnostics.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn step_budget_aborts_with_a_diagnostic() {
        let recorder = Recorder::new();
        let diagnostics = sink();
        let engine =
            engine_with(&recorder, Arc::clone(&diagnostics)).with_step_budget(2);
        let line = CodeLine::new(
            EventKind::PlayerJoin,
            vec![say("1"), say("2"), say("3")],
        );

        let report = engine.run_line_for(&line, None, None);

        assert_eq!(recorder.take(), vec!["1", "2"]);
        assert!(report.aborted);
        assert!(diagnostics.0.lock().unwrap()[0].message.contains("step budget"));
    }

    #[test]
    fn run_script_filters_by_event_and_enabled_flag() {
        let recorder = Recorder::new();
        let engine = engine_with(&recorder, sink());
        let mut script = CodeScript::new(
            "greetings",
            vec![
                CodeLine::new(EventKind::PlayerJoin, vec![say("hello")]),
                CodeLine::new(EventKind::PlayerQuit, vec![say("bye")]),
            ],
            vec![],
        );

        let reports = engine.run_script(&script, EventKind::PlayerJoin, None, None);
        assert_eq!(reports.len(), 1);
        assert_eq!(recorder.take(), vec!["hello"]);

        script.enabled = false;
        assert!(
            engine
                .run_script(&script, EventKind::PlayerJoin, None, None)
                .is_empty()
        );
        assert!(recorder.take().is_empty());
    }

    /// Action that writes a LOCAL variable for the current invocation.
    struct Stash(Arc<VariableStore>);

    impl ActionHandler for Stash {
        fn id(&self) -> &str {
            "stash"
        }

        fn execute(&self, ctx: &ExecutionContext, _args: &ResolvedArgs) -> ExecutionResult {
            self.0
                .set(
                    Scope::Local,
                    Owner::Invocation(ctx.invocation),
                    "x",
                    DataValue::Number(1.0),
                )
                .expect("local scope is writable");
            ExecutionResult::success()
        }
    }

    #[test]
    fn local_variables_are_reaped_after_the_pass() {
        let variables = Arc::new(VariableStore::new());
        let mut actions = ActionRegistry::new();
        actions.register(Arc::new(Stash(Arc::clone(&variables))));
        let engine = ExecutionEngine::new(
            Arc::new(actions),
            Arc::new(ConditionRegistry::new()),
            Arc::clone(&variables),
            sink(),
        );

        let line = CodeLine::new(
            EventKind::PlayerJoin,
            vec![ActionBlockData::new(OpKind::Action, "stash", vec![])],
        );
        let report = engine.run_line_for(&line, None, None);

        assert_eq!(report.executed, 1);
        // The first pass used invocation 0; its LOCAL entries are gone.
        assert_eq!(
            variables.get(Scope::Local, Owner::Invocation(InvocationId(0)), "x"),
            None
        );
    }
}
