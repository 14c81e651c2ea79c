// src/errors.rs

//! Crate-wide error type and `Result` alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskpipeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task already registered: {0}")]
    DuplicateName(String),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Cycle detected in task graph: {0}")]
    DagCycle(String),

    /// A transform stage failed for one file of a pipe.
    #[error("stage '{stage}' failed on {}: {source:#}", path.display())]
    Stage {
        path: PathBuf,
        stage: String,
        #[source]
        source: anyhow::Error,
    },

    /// First failing sub-task of a `series` / `parallel` composite.
    ///
    /// Wrapped once, at the innermost composite; enclosing composites pass
    /// it through unchanged.
    #[error("task '{task}' failed: {source}")]
    CompositeFailure {
        task: String,
        #[source]
        source: Box<TaskpipeError>,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskpipeError {
    /// The original failure underneath any `CompositeFailure` wrapper.
    pub fn root_cause(&self) -> &TaskpipeError {
        match self {
            TaskpipeError::CompositeFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskpipeError>;
