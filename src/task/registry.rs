// src/task/registry.rs

use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::{Result, TaskpipeError};
use crate::task::Task;
use crate::types::TaskName;

/// Name -> task mapping. Names are unique; registration order does not
/// matter because references are resolved at run time.
#[derive(Debug, Default, Clone)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<TaskName>, task: Task) -> Result<()> {
        let name = name.into();
        if self.tasks.contains_key(&name) {
            return Err(TaskpipeError::DuplicateName(name));
        }
        debug!(task = %name, kind = ?task, "registered task");
        self.tasks.insert(name, task);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&Task> {
        self.tasks
            .get(name)
            .ok_or_else(|| TaskpipeError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }
}
