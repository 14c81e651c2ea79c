// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile, StageConfig, TaskConfig, TaskRefConfig};
use crate::errors::{Result, TaskpipeError};
use crate::pipe::MatchSet;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskpipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.task, raw.watch))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    for (name, task) in cfg.task.iter() {
        validate_task_shape(name, task)?;
    }
    validate_references(cfg)?;
    validate_watches(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(TaskpipeError::ConfigError(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.debounce_ms == 0 {
        return Err(TaskpipeError::ConfigError(
            "[config].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_shape(name: &str, task: &TaskConfig) -> Result<()> {
    let kinds = task.body_kinds();
    match kinds.len() {
        0 => {
            return Err(TaskpipeError::ConfigError(format!(
                "task '{name}' needs one of `cmd`, `src`, `series` or `parallel`"
            )));
        }
        1 => {}
        _ => {
            return Err(TaskpipeError::ConfigError(format!(
                "task '{name}' sets more than one of {kinds:?}; pick one"
            )));
        }
    }

    let is_pipe = task.src.is_some();
    if !is_pipe && (!task.stages.is_empty() || task.dest.is_some() || task.sourcemaps) {
        return Err(TaskpipeError::ConfigError(format!(
            "task '{name}' uses `stages`, `dest` or `sourcemaps` without `src`"
        )));
    }

    if let Some(src) = &task.src {
        MatchSet::from_patterns(src).map_err(|e| {
            TaskpipeError::ConfigError(format!("task '{name}' has an invalid `src`: {e:#}"))
        })?;
        for stage in &task.stages {
            if let StageConfig::Command(cmd) = stage {
                if cmd.trim().is_empty() {
                    return Err(TaskpipeError::ConfigError(format!(
                        "task '{name}' has an empty `command` stage"
                    )));
                }
            }
        }
    }

    if let Some(cmd) = &task.cmd {
        if cmd.trim().is_empty() {
            return Err(TaskpipeError::ConfigError(format!(
                "task '{name}' has an empty `cmd`"
            )));
        }
    }

    for list in [&task.series, &task.parallel].into_iter().flatten() {
        ensure_non_empty_lists(name, list)?;
    }

    Ok(())
}

fn ensure_non_empty_lists(owner: &str, list: &[TaskRefConfig]) -> Result<()> {
    if list.is_empty() {
        return Err(TaskpipeError::ConfigError(format!(
            "'{owner}' has an empty `series` / `parallel` list"
        )));
    }
    for entry in list {
        match entry {
            TaskRefConfig::Name(_) => {}
            TaskRefConfig::Series { series: inner } | TaskRefConfig::Parallel { parallel: inner } => {
                ensure_non_empty_lists(owner, inner)?;
            }
        }
    }
    Ok(())
}

fn validate_references(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.referenced_tasks() {
            if !cfg.task.contains_key(dep) {
                return Err(TaskpipeError::ConfigError(format!(
                    "task '{name}' references unknown task '{dep}'"
                )));
            }
        }
    }
    Ok(())
}

fn validate_watches(cfg: &RawConfigFile) -> Result<()> {
    for (idx, watch) in cfg.watch.iter().enumerate() {
        MatchSet::from_patterns(&watch.src).map_err(|e| {
            TaskpipeError::ConfigError(format!("[[watch]] #{idx} has an invalid `src`: {e:#}"))
        })?;

        if let TaskRefConfig::Series { series: list } | TaskRefConfig::Parallel { parallel: list } =
            &watch.task
        {
            ensure_non_empty_lists(&format!("[[watch]] #{idx}"), list)?;
        }

        let mut names = Vec::new();
        watch.task.collect_names(&mut names);
        for dep in names {
            if !cfg.task.contains_key(dep) {
                return Err(TaskpipeError::ConfigError(format!(
                    "[[watch]] #{idx} references unknown task '{dep}'"
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: composite -> referenced task.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in cfg.task.iter() {
        for dep in task.referenced_tasks() {
            graph.add_edge(name.as_str(), dep, ());
        }
    }

    // A topological sort will fail if there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(TaskpipeError::DagCycle(format!(
                "cycle detected in task graph involving task '{}'",
                node
            )))
        }
    }
}
