// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeOptions, TaskOutcome, TriggerReason};
use crate::types::TaskName;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start one run of this watched target.
    Dispatch(TaskName),
    /// Request that the process exits (used for `--once` when idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// A trigger either starts the task right away or, if an instance is
/// already running, goes through the trigger queue.
pub fn handle_task_trigger(
    running: &mut HashSet<TaskName>,
    queue: &mut TriggerQueue,
    task: TaskName,
    reason: TriggerReason,
) -> CoreStep {
    if running.contains(&task) {
        queue.record_trigger(&task);
        return CoreStep::running(Vec::new());
    }

    info!(task = %task, ?reason, "triggered");
    running.insert(task.clone());
    CoreStep::running(vec![CoreCommand::Dispatch(task)])
}

/// A finished run frees its task; a queued re-run starts immediately.
pub fn handle_task_completion(
    running: &mut HashSet<TaskName>,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    task: TaskName,
    outcome: TaskOutcome,
) -> CoreStep {
    match &outcome {
        TaskOutcome::Success => info!(task = %task, "watched task finished"),
        TaskOutcome::Failed(reason) => {
            warn!(task = %task, error = %reason, "watched task failed; still watching")
        }
    }

    running.remove(&task);

    let mut commands = Vec::new();
    if queue.take(&task) {
        info!(task = %task, "starting queued re-run");
        running.insert(task.clone());
        commands.push(CoreCommand::Dispatch(task));
    }

    let mut keep_running = true;
    if options.exit_when_idle && running.is_empty() && queue.is_empty() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}
