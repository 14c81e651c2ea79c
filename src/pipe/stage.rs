// src/pipe/stage.rs

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;

use crate::exec::command;
use crate::pipe::file::SourceFile;
use crate::pipe::rename::{RenameRule, apply_all};
use crate::task::BoxFuture;

/// A transformation applied to every file of a pipe.
///
/// Stages may rewrite content, path metadata, or both. An error aborts the
/// pipe; it is reported with the stage name and the file's original path.
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, file: SourceFile) -> BoxFuture<'_, Result<SourceFile>>;
}

/// Rewrites the output path with a list of rename rules.
#[derive(Debug, Clone)]
pub struct RenameStage {
    rules: Vec<RenameRule>,
}

impl RenameStage {
    pub fn new(rules: Vec<RenameRule>) -> Self {
        Self { rules }
    }
}

impl Stage for RenameStage {
    fn name(&self) -> &str {
        "rename"
    }

    fn apply(&self, mut file: SourceFile) -> BoxFuture<'_, Result<SourceFile>> {
        Box::pin(async move {
            file.meta = apply_all(&self.rules, &file.meta);
            Ok(file)
        })
    }
}

/// Pipes file content through a shell command (stdin to stdout).
///
/// The command runs in the project root with `TASKPIPE_FILE` set to the
/// original relative path and `TASKPIPE_OUTPUT` set to the current output
/// path.
#[derive(Debug, Clone)]
pub struct CommandStage {
    cmd: String,
    cwd: PathBuf,
}

impl CommandStage {
    pub fn new(cmd: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            cwd: cwd.into(),
        }
    }
}

impl Stage for CommandStage {
    fn name(&self) -> &str {
        &self.cmd
    }

    fn apply(&self, mut file: SourceFile) -> BoxFuture<'_, Result<SourceFile>> {
        Box::pin(async move {
            let env = [
                ("TASKPIPE_FILE", slashed(&file.source)),
                ("TASKPIPE_OUTPUT", slashed(&file.relative_path())),
            ];
            let input = std::mem::take(&mut file.contents);
            file.contents = command::filter(&self.cmd, &self.cwd, &env, input).await?;
            Ok(file)
        })
    }
}

/// In-process stage built from a closure.
pub struct FnStage<F> {
    name: String,
    f: F,
}

impl<F> FnStage<F>
where
    F: Fn(SourceFile) -> Result<SourceFile> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for FnStage<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(SourceFile) -> Result<SourceFile> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, file: SourceFile) -> BoxFuture<'_, Result<SourceFile>> {
        let out = (self.f)(file);
        Box::pin(async move { out })
    }
}

fn slashed(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
