// tests/runner_composites.rs

mod common;

use std::sync::Arc;
use std::time::Duration;

use taskpipe::errors::TaskpipeError;
use taskpipe::fs::RealFileSystem;
use taskpipe::pipe::{MatchSet, Pipe};
use taskpipe::task::{Task, TaskRegistry, TaskRunner};
use tempfile::TempDir;

use crate::common::{Probe, init_tracing, with_timeout, write_tree};

fn runner_with(tasks: Vec<(&str, Task)>) -> TaskRunner {
    let mut registry = TaskRegistry::new();
    for (name, task) in tasks {
        registry.register(name, task).unwrap();
    }
    TaskRunner::new(registry)
}

#[tokio::test]
async fn sequence_stops_at_first_failure() {
    init_tracing();
    let probe = Probe::new();
    let runner = runner_with(vec![
        ("T1", probe.task("T1")),
        ("T2", probe.failing("T2", "boom")),
        ("T3", probe.task("T3")),
    ]);

    let err = with_timeout(runner.run(Task::series([
        Task::reference("T1"),
        Task::reference("T2"),
        Task::reference("T3"),
    ])))
    .await
    .unwrap_err();

    assert!(probe.finished("T1"));
    assert!(probe.started("T2"));
    assert!(!probe.started("T3"), "T3 must never start: {:?}", probe.events());

    match &err {
        TaskpipeError::CompositeFailure { task, .. } => assert_eq!(task, "T2"),
        other => panic!("expected CompositeFailure, got {other:?}"),
    }
    assert_eq!(err.root_cause().to_string(), "boom");
}

#[tokio::test]
async fn sequence_runs_in_declared_order() {
    let probe = Probe::new();
    let runner = runner_with(vec![]);

    with_timeout(runner.run(Task::series([
        probe.slow("a", Duration::from_millis(20)),
        probe.task("b"),
        probe.task("c"),
    ])))
    .await
    .unwrap();

    assert_eq!(
        probe.events(),
        vec!["start:a", "end:a", "start:b", "end:b", "start:c", "end:c"]
    );
}

#[tokio::test]
async fn parallel_runs_children_concurrently() {
    let probe = Probe::new();
    let runner = runner_with(vec![]);

    with_timeout(runner.run(Task::parallel([
        probe.slow("a", Duration::from_millis(100)),
        probe.slow("b", Duration::from_millis(100)),
    ])))
    .await
    .unwrap();

    let events = probe.events();
    // Both start before either ends.
    let first_end = events.iter().position(|e| e.starts_with("end:")).unwrap();
    assert_eq!(first_end, 2, "{events:?}");
}

#[tokio::test]
async fn parallel_pipes_both_write_their_outputs() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), &[("src/js/app.js", "js"), ("src/css/site.css", "css")]);

    let fs = Arc::new(RealFileSystem);
    let js = Pipe::new(
        "js",
        dir.path(),
        fs.clone(),
        MatchSet::from_patterns(&["src/js/**/*.js"]).unwrap(),
    )
    .dest("out");
    let css = Pipe::new(
        "css",
        dir.path(),
        fs,
        MatchSet::from_patterns(&["src/css/**/*.css"]).unwrap(),
    )
    .dest("out");

    let runner = runner_with(vec![("js", js.into_task()), ("css", css.into_task())]);
    with_timeout(runner.run(Task::parallel([
        Task::reference("js"),
        Task::reference("css"),
    ])))
    .await
    .unwrap();

    assert!(dir.path().join("out/src/js/app.js").is_file());
    assert!(dir.path().join("out/src/css/site.css").is_file());
}

#[tokio::test]
async fn parallel_failure_returns_early_and_siblings_keep_running() {
    let probe = Probe::new();
    let runner = runner_with(vec![]);

    let err = with_timeout(runner.run(Task::parallel([
        probe.failing("fast", "nope"),
        probe.slow("slow", Duration::from_millis(200)),
    ])))
    .await
    .unwrap_err();

    match &err {
        TaskpipeError::CompositeFailure { task, .. } => assert_eq!(task, "fast"),
        other => panic!("expected CompositeFailure, got {other:?}"),
    }
    assert!(!probe.finished("slow"), "parallel should not wait for siblings");

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(probe.finished("slow"), "sibling must not be cancelled");
}

#[tokio::test]
async fn nested_composites_wrap_the_failure_once() {
    let probe = Probe::new();
    let runner = runner_with(vec![
        ("ok", probe.task("ok")),
        ("bad", probe.failing("bad", "exit 1")),
        ("inner", Task::series([Task::reference("ok"), Task::reference("bad")])),
    ]);

    let err = with_timeout(runner.run(Task::parallel([Task::series([
        Task::reference("inner"),
    ])])))
    .await
    .unwrap_err();

    match &err {
        TaskpipeError::CompositeFailure { task, source } => {
            assert_eq!(task, "bad");
            assert!(!matches!(**source, TaskpipeError::CompositeFailure { .. }));
        }
        other => panic!("expected CompositeFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_reference_is_not_found() {
    let runner = runner_with(vec![]);
    let err = runner.run_named("nope").await.unwrap_err();
    assert!(matches!(err, TaskpipeError::NotFound(ref n) if n == "nope"));
}

#[tokio::test]
async fn empty_composites_succeed() {
    let runner = runner_with(vec![]);
    runner.run(Task::series([])).await.unwrap();
    runner.run(Task::parallel([])).await.unwrap();
}

#[tokio::test]
async fn a_task_can_run_more_than_once() {
    let probe = Probe::new();
    let runner = runner_with(vec![("t", probe.task("t"))]);
    runner.run_named("t").await.unwrap();
    runner.run_named("t").await.unwrap();
    assert_eq!(probe.events().len(), 4);
}

#[tokio::test]
async fn self_referencing_registry_fails_instead_of_looping() {
    let probe = Probe::new();
    let runner = runner_with(vec![
        ("alias", Task::reference("alias")),
        ("ok", probe.task("ok")),
        ("loop", Task::series([Task::reference("ok"), Task::reference("loop")])),
    ]);

    let err = with_timeout(runner.run_named("alias")).await.unwrap_err();
    assert!(matches!(err, TaskpipeError::DagCycle(ref chain) if chain == "alias -> alias"));

    let err = with_timeout(runner.run_named("loop")).await.unwrap_err();
    assert!(
        matches!(err.root_cause(), TaskpipeError::DagCycle(chain) if chain == "loop -> loop"),
        "{err:?}"
    );
    assert!(probe.finished("ok"));
}

#[tokio::test]
async fn shared_task_in_sibling_branches_is_not_a_cycle() {
    let probe = Probe::new();
    let runner = runner_with(vec![
        ("lib", probe.task("lib")),
        ("a", Task::series([Task::reference("lib")])),
        ("b", Task::series([Task::reference("lib")])),
    ]);

    with_timeout(runner.run(Task::parallel([Task::reference("a"), Task::reference("b")])))
        .await
        .unwrap();
    assert_eq!(probe.events().len(), 4);
}
