// tests/command.rs
#![cfg(unix)]

mod common;

use std::path::PathBuf;
use std::sync::Arc;

use taskpipe::errors::TaskpipeError;
use taskpipe::exec::{CommandTask, run_shell};
use taskpipe::fs::RealFileSystem;
use taskpipe::pipe::{CommandStage, MatchSet, Pipe};
use taskpipe::task::{Task, TaskRegistry, TaskRunner};
use tempfile::TempDir;

use crate::common::{read, write_tree};

#[tokio::test]
async fn run_shell_captures_stdout_and_feeds_stdin() {
    let dir = TempDir::new().unwrap();
    let out = run_shell("tr a-z A-Z", dir.path(), &[], Some(b"hello".to_vec()))
        .await
        .unwrap();
    assert!(out.success);
    assert_eq!(out.stdout, b"HELLO");
}

#[tokio::test]
async fn command_stage_filters_content_and_sees_env() {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), &[("src/js/app.js", "abc")]);

    let pipe = Pipe::new(
        "js",
        dir.path(),
        Arc::new(RealFileSystem),
        MatchSet::from_patterns(&["src/js/*.js"]).unwrap(),
    )
    .stage(CommandStage::new("tr a-z A-Z", dir.path()))
    .stage(CommandStage::new(
        "cat; printf ' %s' \"$TASKPIPE_FILE\"",
        dir.path(),
    ))
    .dest("out");

    let report = pipe.execute().await.unwrap();
    assert_eq!(report.written, vec![PathBuf::from("out/src/js/app.js")]);
    assert_eq!(read(dir.path(), "out/src/js/app.js"), "ABC src/js/app.js");
}

#[tokio::test]
async fn failing_command_stage_reports_stage_and_stderr() {
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), &[("src/a.txt", "a")]);

    let pipe = Pipe::new(
        "txt",
        dir.path(),
        Arc::new(RealFileSystem),
        MatchSet::from_patterns(&["src/*.txt"]).unwrap(),
    )
    .stage(CommandStage::new("echo broken >&2; exit 3", dir.path()));

    let err = pipe.execute().await.unwrap_err();
    match &err {
        TaskpipeError::Stage { path, stage, source } => {
            assert_eq!(path, &PathBuf::from("src/a.txt"));
            assert_eq!(stage, "echo broken >&2; exit 3");
            let msg = format!("{source:#}");
            assert!(msg.contains("status 3"), "{msg}");
            assert!(msg.contains("broken"), "{msg}");
        }
        other => panic!("expected Stage error, got {other:?}"),
    }
}

#[tokio::test]
async fn command_task_runs_in_the_root() {
    let dir = TempDir::new().unwrap();
    let mut registry = TaskRegistry::new();
    registry
        .register(
            "touch",
            Task::body(CommandTask::new("touch", "echo done > marker.txt", dir.path())),
        )
        .unwrap();

    TaskRunner::new(registry).run_named("touch").await.unwrap();
    assert_eq!(read(dir.path(), "marker.txt"), "done\n");
}

#[tokio::test]
async fn command_task_non_zero_exit_fails() {
    let dir = TempDir::new().unwrap();
    let task = Task::body(CommandTask::new("bad", "exit 7", dir.path()));

    let err = TaskRunner::new(TaskRegistry::new())
        .run(Task::series([task]))
        .await
        .unwrap_err();
    assert!(matches!(err, TaskpipeError::CompositeFailure { ref task, .. } if task == "bad"));
    assert!(err.root_cause().to_string().contains("status 7"));
}
