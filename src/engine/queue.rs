// src/engine/queue.rs

use std::collections::VecDeque;

use tracing::debug;

use crate::types::{TaskName, TriggerWhileRunningBehaviour};

/// Triggers that arrived for tasks that were still running.
///
/// Each task has at most one pending entry: however many triggers arrive
/// during a run, they collapse into a single re-run. With
/// [`TriggerWhileRunningBehaviour::Skip`] nothing is ever recorded.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    pending: VecDeque<TaskName>,
}

impl TriggerQueue {
    pub fn new(behaviour: TriggerWhileRunningBehaviour) -> Self {
        Self {
            behaviour,
            pending: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Record a trigger for a running task. Returns true if a new pending
    /// re-run was created.
    pub fn record_trigger(&mut self, task: &str) -> bool {
        match self.behaviour {
            TriggerWhileRunningBehaviour::Skip => {
                debug!(task = %task, "task still running; trigger skipped");
                false
            }
            TriggerWhileRunningBehaviour::Queue => {
                if self.contains(task) {
                    debug!(task = %task, "re-run already queued; trigger merged");
                    return false;
                }
                debug!(task = %task, "task still running; re-run queued");
                self.pending.push_back(task.to_string());
                true
            }
        }
    }

    pub fn contains(&self, task: &str) -> bool {
        self.pending.iter().any(|t| t == task)
    }

    /// Remove the pending entry for `task`, if any.
    pub fn take(&mut self, task: &str) -> bool {
        match self.pending.iter().position(|t| t == task) {
            Some(idx) => {
                self.pending.remove(idx);
                true
            }
            None => false,
        }
    }
}
