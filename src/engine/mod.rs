// src/engine/mod.rs

//! Watch-mode orchestration.
//!
//! File watchers (or `watch --once`) produce [`RuntimeEvent`]s. The pure
//! [`CoreRuntime`] decides which tasks to dispatch, keeping at most one
//! instance of each watched target running and coalescing triggers that
//! arrive meanwhile. The async [`Runtime`] shell reads the event channel
//! and hands dispatches to an [`ExecutorBackend`](crate::exec::ExecutorBackend).

use crate::types::TaskName;

/// How a finished watched target ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(String),
}

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Startup trigger (`watch --once`).
    Manual,
    /// A debounced burst of filesystem events.
    FileWatch,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Exit once nothing is running and nothing is queued (`--once`).
    pub exit_when_idle: bool,
}

/// Tally of finished runs, returned when the runtime stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    /// Targets whose run failed, once per failed run.
    pub failed: Vec<TaskName>,
}

/// Events flowing into the runtime.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    TaskTriggered {
        task: TaskName,
        reason: TriggerReason,
    },
    TaskCompleted {
        task: TaskName,
        outcome: TaskOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
