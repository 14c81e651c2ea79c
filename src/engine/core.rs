// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! Consumes [`RuntimeEvent`]s and returns [`CoreStep`]s describing what the
//! IO shell should do. No channels, no Tokio types, no IO, so it can be
//! tested synchronously.

use std::collections::HashSet;

use crate::engine::event_handlers::{CoreStep, handle_task_completion, handle_task_trigger};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RunSummary, RuntimeEvent, RuntimeOptions, TaskOutcome};
use crate::types::{TaskName, TriggerWhileRunningBehaviour};

#[derive(Debug)]
pub struct CoreRuntime {
    running: HashSet<TaskName>,
    queue: TriggerQueue,
    options: RuntimeOptions,
    summary: RunSummary,
}

impl CoreRuntime {
    pub fn new(behaviour: TriggerWhileRunningBehaviour, options: RuntimeOptions) -> Self {
        Self {
            running: HashSet::new(),
            queue: TriggerQueue::new(behaviour),
            options,
            summary: RunSummary::default(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    pub fn is_running(&self, task: &str) -> bool {
        self.running.contains(task)
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => {
                handle_task_trigger(&mut self.running, &mut self.queue, task, reason)
            }
            RuntimeEvent::TaskCompleted { task, outcome } => {
                match outcome {
                    TaskOutcome::Success => self.summary.succeeded += 1,
                    TaskOutcome::Failed(_) => self.summary.failed.push(task.clone()),
                }
                handle_task_completion(
                    &mut self.running,
                    &mut self.queue,
                    &self.options,
                    task,
                    outcome,
                )
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
