use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskpipe::errors::TaskpipeError;
use taskpipe::task::Task;

/// Builds leaf tasks that record when they start and finish.
///
/// Events are strings like `"start:T1"` / `"end:T1"`, appended in the
/// order they happen across all tasks made by the same probe.
#[derive(Clone, Default)]
pub struct Probe {
    events: Arc<Mutex<Vec<String>>>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeeds immediately.
    pub fn task(&self, name: &str) -> Task {
        self.make(name, Duration::ZERO, None)
    }

    /// Sleeps for `delay`, then succeeds.
    pub fn slow(&self, name: &str, delay: Duration) -> Task {
        self.make(name, delay, None)
    }

    /// Fails with `message` after recording its start.
    pub fn failing(&self, name: &str, message: &str) -> Task {
        self.make(name, Duration::ZERO, Some(message.to_string()))
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn started(&self, name: &str) -> bool {
        self.events().contains(&format!("start:{name}"))
    }

    pub fn finished(&self, name: &str) -> bool {
        self.events().contains(&format!("end:{name}"))
    }

    fn make(&self, name: &str, delay: Duration, fail: Option<String>) -> Task {
        let events = Arc::clone(&self.events);
        let label = name.to_string();
        Task::from_fn(name, move || {
            let events = Arc::clone(&events);
            let label = label.clone();
            let fail = fail.clone();
            async move {
                events.lock().unwrap().push(format!("start:{label}"));
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                events.lock().unwrap().push(format!("end:{label}"));
                match fail {
                    Some(msg) => Err(TaskpipeError::Other(anyhow::anyhow!(msg))),
                    None => Ok(()),
                }
            }
        })
    }
}
