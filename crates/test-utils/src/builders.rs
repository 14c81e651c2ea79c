#![allow(dead_code)]

use taskpipe::config::{
    ConfigFile, ConfigSection, RawConfigFile, StageConfig, TaskConfig, TaskRefConfig, WatchConfig,
};
use taskpipe::errors::Result;
use taskpipe::pipe::RenameRule;
use taskpipe::types::TriggerWhileRunningBehaviour;

/// Builder for `ConfigFile` to simplify test setup.
#[derive(Default)]
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_watch(mut self, src: &[&str], task: TaskRefConfig) -> Self {
        self.config.watch.push(WatchConfig {
            src: src.iter().map(|s| s.to_string()).collect(),
            task,
        });
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.config.debounce_ms = ms;
        self
    }

    pub fn triggered_while_running(mut self, behaviour: TriggerWhileRunningBehaviour) -> Self {
        self.config.config.triggered_while_running = behaviour;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn cmd(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: Some(cmd.to_string()),
                ..TaskConfig::default()
            },
        }
    }

    pub fn pipe(src: &[&str]) -> Self {
        Self {
            task: TaskConfig {
                src: Some(src.iter().map(|s| s.to_string()).collect()),
                ..TaskConfig::default()
            },
        }
    }

    pub fn series(entries: Vec<TaskRefConfig>) -> Self {
        Self {
            task: TaskConfig {
                series: Some(entries),
                ..TaskConfig::default()
            },
        }
    }

    pub fn parallel(entries: Vec<TaskRefConfig>) -> Self {
        Self {
            task: TaskConfig {
                parallel: Some(entries),
                ..TaskConfig::default()
            },
        }
    }

    /// A task with no body at all (invalid on purpose).
    pub fn empty() -> Self {
        Self {
            task: TaskConfig::default(),
        }
    }

    pub fn command_stage(mut self, cmd: &str) -> Self {
        self.task.stages.push(StageConfig::Command(cmd.to_string()));
        self
    }

    pub fn rename(mut self, rules: Vec<RenameRule>) -> Self {
        self.task.stages.push(StageConfig::Rename(rules));
        self
    }

    pub fn dest(mut self, dest: &str) -> Self {
        self.task.dest = Some(dest.to_string());
        self
    }

    pub fn sourcemaps(mut self, on: bool) -> Self {
        self.task.sourcemaps = on;
        self
    }

    pub fn with_cmd(mut self, cmd: &str) -> Self {
        self.task.cmd = Some(cmd.to_string());
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.task.description = Some(desc.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

/// `TaskRefConfig::Name` shorthand.
pub fn name(task: &str) -> TaskRefConfig {
    TaskRefConfig::Name(task.to_string())
}

pub fn series_of(entries: Vec<TaskRefConfig>) -> TaskRefConfig {
    TaskRefConfig::Series { series: entries }
}

pub fn parallel_of(entries: Vec<TaskRefConfig>) -> TaskRefConfig {
    TaskRefConfig::Parallel { parallel: entries }
}

/// Config section with defaults, for tests that poke at it directly.
pub fn default_section() -> ConfigSection {
    ConfigSection::default()
}
