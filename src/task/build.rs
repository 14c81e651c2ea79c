// src/task/build.rs

//! Turning a validated config into registered tasks.

use std::sync::Arc;

use crate::config::{ConfigFile, Settings, StageConfig, TaskConfig, TaskRefConfig};
use crate::errors::{Result, TaskpipeError};
use crate::exec::CommandTask;
use crate::fs::FileSystem;
use crate::pipe::{CommandStage, MatchSet, Pipe, RenameStage, SourceMapOptions, Stage};
use crate::task::{Task, TaskRegistry};

impl TaskRegistry {
    /// Register every `[task.<name>]` of `cfg`.
    pub fn from_config(
        cfg: &ConfigFile,
        settings: &Settings,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self> {
        let mut registry = TaskRegistry::new();
        for (name, task_cfg) in cfg.tasks() {
            let task = compile_task(name, task_cfg, settings, &fs)?;
            registry.register(name.clone(), task)?;
        }
        Ok(registry)
    }
}

/// Convert a `series` / `parallel` entry into a task tree; names become
/// by-name references.
pub fn compile_ref(entry: &TaskRefConfig) -> Task {
    match entry {
        TaskRefConfig::Name(name) => Task::reference(name.clone()),
        TaskRefConfig::Series { series } => Task::series(series.iter().map(compile_ref)),
        TaskRefConfig::Parallel { parallel } => Task::parallel(parallel.iter().map(compile_ref)),
    }
}

fn compile_task(
    name: &str,
    cfg: &TaskConfig,
    settings: &Settings,
    fs: &Arc<dyn FileSystem>,
) -> Result<Task> {
    if let Some(cmd) = &cfg.cmd {
        return Ok(Task::body(CommandTask::new(name, cmd.clone(), settings.root.clone())));
    }
    if let Some(src) = &cfg.src {
        return compile_pipe(name, src, cfg, settings, fs);
    }
    if let Some(series) = &cfg.series {
        return Ok(Task::series(series.iter().map(compile_ref)));
    }
    if let Some(parallel) = &cfg.parallel {
        return Ok(Task::parallel(parallel.iter().map(compile_ref)));
    }
    Err(TaskpipeError::ConfigError(format!("task '{name}' has no body")))
}

fn compile_pipe(
    name: &str,
    src: &[String],
    cfg: &TaskConfig,
    settings: &Settings,
    fs: &Arc<dyn FileSystem>,
) -> Result<Task> {
    let match_set = MatchSet::from_patterns_with_base(src, &settings.base_path)?;

    let stages = cfg
        .stages
        .iter()
        .map(|stage| -> Arc<dyn Stage> {
            match stage {
                StageConfig::Command(cmd) => {
                    Arc::new(CommandStage::new(cmd.clone(), settings.root.clone()))
                }
                StageConfig::Rename(rules) => Arc::new(RenameStage::new(rules.clone())),
            }
        })
        .collect::<Vec<_>>();

    let mut pipe = Pipe::new(name, settings.root.clone(), Arc::clone(fs), match_set).stages(stages);
    if let Some(dest) = &cfg.dest {
        pipe = pipe.dest(dest);
    }
    if cfg.sourcemaps {
        pipe = pipe.source_maps(SourceMapOptions {
            debug: settings.debug,
        });
    }
    Ok(pipe.into_task())
}
