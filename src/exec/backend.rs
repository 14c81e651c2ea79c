// src/exec/backend.rs

//! Pluggable executor backend for the watch runtime.
//!
//! The runtime only says "run target X"; the backend decides how. The
//! production [`RealExecutorBackend`] runs task trees on the [`TaskRunner`]
//! and reports back with `TaskCompleted`. Tests substitute a fake that
//! records dispatches without running anything.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::errors::Result;
use crate::task::{BoxFuture, Task, TaskRunner};
use crate::types::TaskName;

pub trait ExecutorBackend: Send {
    /// Start one run of `task`. Must not wait for it to finish; completion
    /// is reported as a `RuntimeEvent::TaskCompleted`.
    fn dispatch(&mut self, task: TaskName) -> BoxFuture<'_, Result<()>>;
}

pub struct RealExecutorBackend {
    runner: TaskRunner,
    /// Watch targets by runtime key. Keys missing here are looked up in
    /// the registry by name.
    targets: HashMap<TaskName, Task>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RealExecutorBackend {
    pub fn new(
        runner: TaskRunner,
        targets: HashMap<TaskName, Task>,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            runner,
            targets,
            runtime_tx,
        }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn dispatch(&mut self, task: TaskName) -> BoxFuture<'_, Result<()>> {
        let target = self
            .targets
            .get(&task)
            .cloned()
            .unwrap_or_else(|| Task::reference(task.clone()));
        let fut = self.runner.run(target);
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            tokio::spawn(async move {
                let outcome = match fut.await {
                    Ok(()) => TaskOutcome::Success,
                    Err(err) => TaskOutcome::Failed(err.to_string()),
                };
                if tx
                    .send(RuntimeEvent::TaskCompleted {
                        task: task.clone(),
                        outcome,
                    })
                    .await
                    .is_err()
                {
                    debug!(task = %task, "runtime gone before completion was reported");
                }
            });
            Ok(())
        })
    }
}
