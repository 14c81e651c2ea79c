// src/watch/binding.rs

use std::fmt;

use crate::config::{ConfigFile, Settings};
use crate::errors::Result;
use crate::pipe::MatchSet;
use crate::task::Task;
use crate::task::build::compile_ref;
use crate::types::TaskName;

/// A compiled `[[watch]]` entry: which paths to observe and what to run.
///
/// `key` identifies the target in the runtime (running set, trigger
/// queue). Bindings naming a registered task use that name; inline
/// composites use their rendered label, so two bindings with the same
/// composite share one queue slot.
#[derive(Clone)]
pub struct WatchBinding {
    key: TaskName,
    task: Task,
    match_set: MatchSet,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("key", &self.key)
            .field("match_set", &self.match_set)
            .finish()
    }
}

impl WatchBinding {
    pub fn new(match_set: MatchSet, task: Task) -> Self {
        Self {
            key: task.label(),
            task,
            match_set,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn match_set(&self) -> &MatchSet {
        &self.match_set
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.match_set.matches(rel_path)
    }
}

/// Compile every `[[watch]]` entry. `BASEPATH` is prepended to inclusion
/// patterns, as for pipes.
pub fn bindings_from_config(cfg: &ConfigFile, settings: &Settings) -> Result<Vec<WatchBinding>> {
    cfg.watches()
        .iter()
        .map(|watch| {
            let match_set = MatchSet::from_patterns_with_base(&watch.src, &settings.base_path)?;
            Ok(WatchBinding::new(match_set, compile_ref(&watch.task)))
        })
        .collect()
}
