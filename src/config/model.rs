// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::pipe::RenameRule;
use crate::types::{TaskName, TriggerWhileRunningBehaviour};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// debounce_ms = 200
///
/// [task.js]
/// src = ["src/js/**/*.js", "!node_modules/**/*.js"]
/// stages = [
///   { command = "npx babel" },
///   { rename = [{ relocate = { from = "src", to = "dist" } }, "lowercase", { prefix = "ensemble-" }] },
/// ]
///
/// [task.default]
/// parallel = [{ series = ["js", "js_uglify"] }, "css"]
///
/// [[watch]]
/// src = ["src/js/**/*.js"]
/// task = "js"
/// ```
///
/// This is the unvalidated form; use [`ConfigFile`] (via `TryFrom`) in the
/// rest of the crate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<TaskName, TaskConfig>,

    /// Watch bindings from `[[watch]]`.
    #[serde(default)]
    pub watch: Vec<WatchConfig>,
}

/// A validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>`, so holders can assume
/// every task reference resolves and the task graph is acyclic.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    task: BTreeMap<TaskName, TaskConfig>,
    watch: Vec<WatchConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        task: BTreeMap<TaskName, TaskConfig>,
        watch: Vec<WatchConfig>,
    ) -> Self {
        Self {
            config,
            task,
            watch,
        }
    }

    pub fn config_section(&self) -> &ConfigSection {
        &self.config
    }

    pub fn tasks(&self) -> &BTreeMap<TaskName, TaskConfig> {
        &self.task
    }

    pub fn watches(&self) -> &[WatchConfig] {
        &self.watch
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Quiet period (milliseconds) before a burst of file events re-runs a
    /// watched task.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// What to do with a watch trigger for a task that is still running.
    #[serde(default)]
    pub triggered_while_running: TriggerWhileRunningBehaviour,
}

pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            triggered_while_running: TriggerWhileRunningBehaviour::default(),
        }
    }
}

/// `[task.<name>]` section.
///
/// Exactly one of `cmd`, `src`, `series` or `parallel` must be set; this is
/// checked in `config::validate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Free-form description shown by `taskpipe list`.
    #[serde(default)]
    pub description: Option<String>,

    /// Shell command to run as the task body.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Match set of a file pipe. Entries starting with `!` are exclusions.
    #[serde(default)]
    pub src: Option<Vec<String>>,

    /// Transform stages of a file pipe, applied left to right.
    #[serde(default)]
    pub stages: Vec<StageConfig>,

    /// Destination root of a file pipe, relative to the project root.
    ///
    /// Output paths are `dest/<rewritten relative path>`; defaults to `.`
    /// so that rename rules fully decide where a file lands.
    #[serde(default)]
    pub dest: Option<String>,

    /// Write a companion `.map` file next to every pipe output.
    #[serde(default)]
    pub sourcemaps: bool,

    /// Run these tasks one after the other.
    #[serde(default)]
    pub series: Option<Vec<TaskRefConfig>>,

    /// Run these tasks concurrently.
    #[serde(default)]
    pub parallel: Option<Vec<TaskRefConfig>>,
}

impl TaskConfig {
    /// Names of the body keys that are set, in declaration order.
    pub fn body_kinds(&self) -> Vec<&'static str> {
        let mut kinds = Vec::new();
        if self.cmd.is_some() {
            kinds.push("cmd");
        }
        if self.src.is_some() {
            kinds.push("src");
        }
        if self.series.is_some() {
            kinds.push("series");
        }
        if self.parallel.is_some() {
            kinds.push("parallel");
        }
        kinds
    }

    /// Task names referenced (directly or through inline composites) by
    /// this task's `series` / `parallel` lists.
    pub fn referenced_tasks(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for list in [&self.series, &self.parallel].into_iter().flatten() {
            for entry in list {
                entry.collect_names(&mut out);
            }
        }
        out
    }
}

/// An entry in a `series` / `parallel` list or a watch binding target.
///
/// Either the name of a registered task or an inline composite:
///
/// ```toml
/// parallel = ["clean", { series = ["js", "js_uglify"] }]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TaskRefConfig {
    Name(TaskName),
    Series { series: Vec<TaskRefConfig> },
    Parallel { parallel: Vec<TaskRefConfig> },
}

impl TaskRefConfig {
    pub fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TaskRefConfig::Name(name) => out.push(name.as_str()),
            TaskRefConfig::Series { series: list } | TaskRefConfig::Parallel { parallel: list } => {
                for entry in list {
                    entry.collect_names(out);
                }
            }
        }
    }
}

/// One transform stage of a pipe.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageConfig {
    /// Pipe file content through an external command (`{ command = "..." }`).
    Command(String),
    /// Rewrite the output path (`{ rename = [...] }`).
    Rename(Vec<RenameRule>),
}

/// `[[watch]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Match set of paths to observe. Entries starting with `!` are exclusions.
    pub src: Vec<String>,
    /// Task (or inline composite) to re-run on change.
    pub task: TaskRefConfig,
}
