//! Script worker that owns the interpreter.
//!
//! All world-mutating interpretation is serialized through this single task:
//! trigger filtering happens on the caller's thread, then matching lines are
//! handed off over the command channel and run here in order. This is the
//! cooperative main-tick boundary; handlers never run concurrently with each
//! other.

use tokio::sync::{mpsc, oneshot};

use script_core::{CodeLine, ExecutionEngine, LineReport};
use tracing::debug;

use crate::events::{Event, EventBus, ScriptEvent, TriggerEvent};

/// One matching line queued for interpretation, tagged with its script so
/// aborts can be reported against it.
pub struct LineJob {
    pub script: String,
    pub line: CodeLine,
}

/// Commands that can be sent to the script worker
pub enum Command {
    /// Interpret a batch of already-filtered lines for one trigger.
    RunLines {
        jobs: Vec<LineJob>,
        trigger: TriggerEvent,
        reply: oneshot::Sender<Vec<LineReport>>,
    },
    /// Stop the worker loop.
    Shutdown,
}

/// Background task that interprets script lines.
pub struct ScriptWorker {
    engine: ExecutionEngine,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl ScriptWorker {
    pub fn new(engine: ExecutionEngine, command_rx: mpsc::Receiver<Command>, event_bus: EventBus) -> Self {
        Self {
            engine,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                Command::RunLines {
                    jobs,
                    trigger,
                    reply,
                } => {
                    let reports = self.run_jobs(jobs, &trigger);
                    if reply.send(reports).is_err() {
                        debug!("RunLines reply channel closed (caller dropped)");
                    }
                }
                Command::Shutdown => break,
            }
        }
    }

    fn run_jobs(&self, jobs: Vec<LineJob>, trigger: &TriggerEvent) -> Vec<LineReport> {
        let mut reports = Vec::with_capacity(jobs.len());

        for job in jobs {
            let report =
                self.engine
                    .run_line_for(&job.line, trigger.player, trigger.location.clone());

            if report.aborted {
                self.event_bus.publish(Event::Script(ScriptEvent::LineAborted {
                    script: job.script,
                    event: job.line.event,
                }));
            }
            reports.push(report);
        }

        reports
    }
}
