// src/types.rs

use serde::Deserialize;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Behaviour when a watch trigger arrives for a task that is still running.
///
/// - `Queue`: remember the trigger and re-run the task once the current run
///   finishes (default). Any number of triggers collapse into one re-run.
/// - `Skip`: drop the trigger; the running instance is considered fresh
///   enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    Queue,
    Skip,
}

impl Default for TriggerWhileRunningBehaviour {
    fn default() -> Self {
        TriggerWhileRunningBehaviour::Queue
    }
}
