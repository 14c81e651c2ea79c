use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use taskpipe::engine::{RuntimeEvent, TaskOutcome};
use taskpipe::errors::Result;
use taskpipe::exec::ExecutorBackend;
use taskpipe::task::BoxFuture;
use taskpipe::types::TaskName;

/// A fake executor that:
/// - records which targets were dispatched
/// - immediately reports `TaskCompleted` for each one, failing the targets
///   listed in `failing`.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<TaskName>>>,
    failing: HashSet<TaskName>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, executed: Arc<Mutex<Vec<TaskName>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            failing: HashSet::new(),
        }
    }

    pub fn failing(mut self, task: &str) -> Self {
        self.failing.insert(task.to_string());
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn dispatch(&mut self, task: TaskName) -> BoxFuture<'_, Result<()>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let outcome = if self.failing.contains(&task) {
            TaskOutcome::Failed(format!("{task} failed on purpose"))
        } else {
            TaskOutcome::Success
        };

        Box::pin(async move {
            executed.lock().unwrap().push(task.clone());
            tx.send(RuntimeEvent::TaskCompleted { task, outcome })
                .await
                .map_err(anyhow::Error::from)?;
            Ok(())
        })
    }
}
