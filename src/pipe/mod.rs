// src/pipe/mod.rs

//! File-transform pipes: resolve a match set, push every file through an
//! ordered list of stages, and write the results under a destination root.

pub mod file;
pub mod matchset;
pub mod rename;
pub mod sourcemap;
pub mod stage;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::errors::{Result, TaskpipeError};
use crate::fs::FileSystem;
use crate::task::{BoxFuture, Task, TaskBody};
use crate::types::TaskName;

pub use file::{PathMeta, SourceFile};
pub use matchset::MatchSet;
pub use rename::RenameRule;
pub use sourcemap::SourceMapOptions;
pub use stage::{CommandStage, FnStage, RenameStage, Stage};

/// Stage name used when reading or writing a file fails.
const READ_STAGE: &str = "read";
const WRITE_STAGE: &str = "dest";

/// A task body that transforms the files selected by a match set.
///
/// Files are processed one after the other in match order. The first stage
/// error stops the pipe; outputs already written stay on disk. A match set
/// that selects nothing is a successful no-op.
#[derive(Clone)]
pub struct Pipe {
    name: TaskName,
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    match_set: MatchSet,
    stages: Vec<Arc<dyn Stage>>,
    dest: PathBuf,
    source_maps: Option<SourceMapOptions>,
}

impl fmt::Debug for Pipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipe")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("match_set", &self.match_set)
            .field(
                "stages",
                &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("dest", &self.dest)
            .field("source_maps", &self.source_maps)
            .finish()
    }
}

/// What a pipe run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipeReport {
    /// Output paths relative to the root, in processing order.
    pub written: Vec<PathBuf>,
}

impl Pipe {
    pub fn new(
        name: impl Into<TaskName>,
        root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        match_set: MatchSet,
    ) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            fs,
            match_set,
            stages: Vec::new(),
            dest: PathBuf::new(),
            source_maps: None,
        }
    }

    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn stages(mut self, stages: impl IntoIterator<Item = Arc<dyn Stage>>) -> Self {
        self.stages.extend(stages);
        self
    }

    /// Destination root relative to the base path (default: the base path
    /// itself, or the root when there is none).
    pub fn dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = dest.into();
        self
    }

    pub fn source_maps(mut self, opts: SourceMapOptions) -> Self {
        self.source_maps = Some(opts);
        self
    }

    pub fn match_set(&self) -> &MatchSet {
        &self.match_set
    }

    pub fn into_task(self) -> Task {
        Task::body(self)
    }

    /// Run the pipe once.
    pub async fn execute(&self) -> Result<PipeReport> {
        let started = Instant::now();

        let fs = Arc::clone(&self.fs);
        let root = self.root.clone();
        let match_set = self.match_set.clone();
        let files = tokio::task::spawn_blocking(move || match_set.resolve(fs.as_ref(), &root))
            .await
            .map_err(|e| TaskpipeError::Other(anyhow::anyhow!("match set walk panicked: {e}")))??;

        debug!(task = %self.name, files = files.len(), "resolved match set");

        let mut report = PipeReport::default();
        for rel in files {
            let written = self.process(rel).await?;
            report.written.push(written);
        }

        info!(
            task = %self.name,
            files = report.written.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipe finished"
        );
        Ok(report)
    }

    async fn process(&self, rel: PathBuf) -> Result<PathBuf> {
        let contents = self
            .fs
            .read(&self.root.join(&rel))
            .map_err(|source| stage_error(&rel, READ_STAGE, source))?;

        let base = self.match_set.base_path().to_path_buf();
        let mut file = SourceFile::under_base(rel.clone(), base, contents);
        for stage in &self.stages {
            file = stage
                .apply(file)
                .await
                .map_err(|source| stage_error(&rel, stage.name(), source))?;
            file.applied.push(stage.name().to_string());
        }

        // `<base>/<dest>/<renamed path>`: outputs stay under BASEPATH.
        let out_rel = file.base.join(&self.dest).join(file.meta.to_relative());
        self.emit(&out_rel, file)
            .map_err(|source| stage_error(&rel, WRITE_STAGE, source))?;

        debug!(task = %self.name, src = %rel.display(), out = %out_rel.display(), "wrote file");
        Ok(out_rel)
    }

    fn emit(&self, out_rel: &Path, file: SourceFile) -> anyhow::Result<()> {
        let out = self.root.join(out_rel);
        let Some(opts) = self.source_maps else {
            return self.fs.write(&out, &file.contents);
        };

        let map = sourcemap::render(&file, &self.name, opts)?;
        let map_out = sourcemap::map_path(&out);
        let map_name = sourcemap::map_path(Path::new(&file.meta.file_name()));
        let contents = sourcemap::with_reference(
            file.contents,
            &file.meta.ext,
            &map_name.to_string_lossy(),
        );
        self.fs.write(&out, &contents)?;
        self.fs.write(&map_out, &map)
    }
}

fn stage_error(path: &Path, stage: &str, source: anyhow::Error) -> TaskpipeError {
    TaskpipeError::Stage {
        path: path.to_path_buf(),
        stage: stage.to_string(),
        source,
    }
}

impl TaskBody for Pipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { self.execute().await.map(|_| ()) })
    }
}

/// Build a pipe task rooted at `root` from a match set and ordered stages.
pub fn build(
    name: impl Into<TaskName>,
    root: impl Into<PathBuf>,
    fs: Arc<dyn FileSystem>,
    match_set: MatchSet,
    stages: Vec<Arc<dyn Stage>>,
) -> Task {
    Pipe::new(name, root, fs, match_set).stages(stages).into_task()
}
