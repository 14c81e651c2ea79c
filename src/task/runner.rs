// src/task/runner.rs

//! Executes task trees: references are resolved against the registry,
//! `Sequence` runs children in order, `Parallel` runs them concurrently.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::errors::{Result, TaskpipeError};
use crate::task::{BoxFuture, Task, TaskRegistry};
use crate::types::TaskName;

#[derive(Debug, Clone)]
pub struct TaskRunner {
    registry: Arc<TaskRegistry>,
}

impl TaskRunner {
    pub fn new(registry: TaskRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Look up `name` and run it.
    pub fn run_named(&self, name: &str) -> BoxFuture<'static, Result<()>> {
        self.run(Task::Ref(name.to_string()))
    }

    /// Run a task tree to completion.
    ///
    /// Composite failures are reported as [`TaskpipeError::CompositeFailure`]
    /// naming the first failing child, wrapped once at the innermost
    /// composite. In a `Parallel`, the composite resolves as soon as one
    /// child fails; the remaining children keep running in the background
    /// and their results are discarded.
    ///
    /// A reference that leads back to one of its own ancestors fails with
    /// [`TaskpipeError::DagCycle`] instead of recursing.
    pub fn run(&self, task: Task) -> BoxFuture<'static, Result<()>> {
        self.run_within(task, Vec::new())
    }

    /// `ancestors` holds the names resolved on the way down to `task`.
    fn run_within(&self, task: Task, ancestors: Vec<TaskName>) -> BoxFuture<'static, Result<()>> {
        let runner = self.clone();
        Box::pin(async move {
            match task {
                Task::Ref(name) => {
                    if let Some(pos) = ancestors.iter().position(|a| *a == name) {
                        let mut chain = ancestors[pos..].to_vec();
                        chain.push(name);
                        return Err(TaskpipeError::DagCycle(chain.join(" -> ")));
                    }
                    let resolved = runner.registry.lookup(&name)?.clone();
                    let mut ancestors = ancestors;
                    ancestors.push(name.clone());
                    runner.run_logged(name, resolved, ancestors).await
                }
                Task::Body(body) => {
                    let name = body.name().to_string();
                    timed(&name, body.call()).await
                }
                Task::Sequence(list) => runner.run_sequence(list, ancestors).await,
                Task::Parallel(list) => runner.run_parallel(list, ancestors).await,
            }
        })
    }

    async fn run_logged(&self, name: TaskName, task: Task, ancestors: Vec<TaskName>) -> Result<()> {
        // Bodies log their own timing in `run_within`.
        if matches!(task, Task::Body(_)) {
            return self.run_within(task, ancestors).await;
        }
        timed(&name, self.run_within(task, ancestors)).await
    }

    async fn run_sequence(&self, list: Vec<Task>, ancestors: Vec<TaskName>) -> Result<()> {
        for task in list {
            let label = task.label();
            self.run_within(task, ancestors.clone())
                .await
                .map_err(|err| composite_failure(label, err))?;
        }
        Ok(())
    }

    async fn run_parallel(&self, list: Vec<Task>, ancestors: Vec<TaskName>) -> Result<()> {
        if list.is_empty() {
            return Ok(());
        }

        let total = list.len();
        let (tx, mut rx) = mpsc::channel::<(String, Result<()>)>(total);

        for task in list {
            let label = task.label();
            let fut = self.run_within(task, ancestors.clone());
            let tx = tx.clone();
            tokio::spawn(async move {
                let res = fut.await;
                let _ = tx.send((label, res)).await;
            });
        }
        drop(tx);

        let mut finished = 0;
        while let Some((label, res)) = rx.recv().await {
            if let Err(err) = res {
                return Err(composite_failure(label, err));
            }
            finished += 1;
            if finished == total {
                return Ok(());
            }
        }

        // Every sender is gone without reporting: a child panicked.
        Err(TaskpipeError::Other(anyhow::anyhow!(
            "{} of {} parallel tasks ended without reporting a result",
            total - finished,
            total
        )))
    }
}

async fn timed(name: &str, fut: impl Future<Output = Result<()>>) -> Result<()> {
    info!(task = %name, "starting");
    let started = Instant::now();
    let res = fut.await;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &res {
        Ok(()) => info!(task = %name, elapsed_ms, "finished"),
        Err(err) => error!(task = %name, elapsed_ms, error = %err, "failed"),
    }
    res
}

fn composite_failure(label: String, err: TaskpipeError) -> TaskpipeError {
    match err {
        wrapped @ TaskpipeError::CompositeFailure { .. } => wrapped,
        other => TaskpipeError::CompositeFailure {
            task: label,
            source: Box::new(other),
        },
    }
}
