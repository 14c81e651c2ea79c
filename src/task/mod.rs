// src/task/mod.rs

//! Tasks: named units of build work and the composites built from them.

pub mod build;
pub mod registry;
pub mod runner;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::Result;
use crate::types::TaskName;

pub use registry::TaskRegistry;
pub use runner::TaskRunner;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The work behind a leaf task.
pub trait TaskBody: Send + Sync {
    fn name(&self) -> &str;

    /// Start one invocation. Each call is independent.
    fn call(&self) -> BoxFuture<'_, Result<()>>;
}

/// A task tree.
///
/// Leaves are either a concrete [`TaskBody`] or a by-name reference into a
/// [`TaskRegistry`], resolved when the runner reaches it. `Sequence` and
/// `Parallel` nodes are anonymous composites.
#[derive(Clone)]
pub enum Task {
    Ref(TaskName),
    Body(Arc<dyn TaskBody>),
    Sequence(Vec<Task>),
    Parallel(Vec<Task>),
}

impl Task {
    pub fn body(body: impl TaskBody + 'static) -> Self {
        Task::Body(Arc::new(body))
    }

    /// Leaf task from an async closure.
    pub fn from_fn<F, Fut>(name: impl Into<TaskName>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Task::body(FnBody {
            name: name.into(),
            f,
        })
    }

    pub fn reference(name: impl Into<TaskName>) -> Self {
        Task::Ref(name.into())
    }

    /// Run `tasks` one after the other, stopping at the first failure.
    pub fn series(tasks: impl IntoIterator<Item = Task>) -> Self {
        Task::Sequence(tasks.into_iter().collect())
    }

    /// Run `tasks` concurrently; the composite fails as soon as one does.
    pub fn parallel(tasks: impl IntoIterator<Item = Task>) -> Self {
        Task::Parallel(tasks.into_iter().collect())
    }

    /// Human-readable name: the task name for leaves, a rendering of the
    /// tree for composites.
    pub fn label(&self) -> String {
        match self {
            Task::Ref(name) => name.clone(),
            Task::Body(body) => body.name().to_string(),
            Task::Sequence(list) => format!("series({})", join_labels(list)),
            Task::Parallel(list) => format!("parallel({})", join_labels(list)),
        }
    }

    /// Structural identity: same bodies (by pointer), same references,
    /// same shape.
    pub fn same_as(&self, other: &Task) -> bool {
        match (self, other) {
            (Task::Ref(a), Task::Ref(b)) => a == b,
            (Task::Body(a), Task::Body(b)) => Arc::ptr_eq(a, b),
            (Task::Sequence(a), Task::Sequence(b)) | (Task::Parallel(a), Task::Parallel(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            _ => false,
        }
    }
}

fn join_labels(list: &[Task]) -> String {
    list.iter().map(Task::label).collect::<Vec<_>>().join(", ")
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

struct FnBody<F> {
    name: TaskName,
    f: F,
}

impl<F, Fut> TaskBody for FnBody<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin((self.f)())
    }
}
