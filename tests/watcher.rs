// tests/watcher.rs

mod common;

use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use taskpipe::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use taskpipe::pipe::MatchSet;
use taskpipe::task::Task;
use taskpipe::types::TriggerWhileRunningBehaviour;
use taskpipe::watch::{WatchBinding, spawn_watcher};
use taskpipe_test_utils::fake_executor::FakeExecutor;

use crate::common::{init_tracing, write_tree};

#[tokio::test]
async fn matching_change_triggers_its_binding() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), &[("src/js/app.js", "a"), ("src/scss/site.scss", "s")]);

    let bindings = vec![
        WatchBinding::new(
            MatchSet::from_patterns(&["src/js/**/*.js"]).unwrap(),
            Task::reference("js"),
        ),
        WatchBinding::new(
            MatchSet::from_patterns(&["src/scss/**/*.scss"]).unwrap(),
            Task::reference("css"),
        ),
    ];

    let (tx, mut rx) = mpsc::channel(16);
    let _handle = spawn_watcher(dir.path(), &bindings, tx, Duration::from_millis(50)).unwrap();

    // Give the backend a moment to register.
    sleep(Duration::from_millis(100)).await;
    fs::write(dir.path().join("src/js/app.js"), "changed").unwrap();

    let event = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no trigger within 5s")
        .expect("channel closed");
    match event {
        RuntimeEvent::TaskTriggered { task, .. } => assert_eq!(task, "js"),
        other => panic!("unexpected event {other:?}"),
    }

    // The scss binding saw nothing.
    while let Ok(Some(ev)) = timeout(Duration::from_millis(300), rx.recv()).await {
        if let RuntimeEvent::TaskTriggered { task, .. } = ev {
            assert_ne!(task, "css");
        }
    }
}

#[tokio::test]
async fn burst_of_writes_dispatches_the_task_once() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    write_tree(dir.path(), &[("src/js/app.js", "a")]);

    let bindings = vec![WatchBinding::new(
        MatchSet::from_patterns(&["src/js/**/*.js"]).unwrap(),
        Task::reference("js"),
    )];

    let (tx, rx) = mpsc::channel(64);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed));
    let core = CoreRuntime::new(TriggerWhileRunningBehaviour::Queue, RuntimeOptions::default());
    let runtime = tokio::spawn(Runtime::new(core, rx, executor).run());

    let _handle =
        spawn_watcher(dir.path(), &bindings, tx.clone(), Duration::from_millis(300)).unwrap();
    sleep(Duration::from_millis(100)).await;

    for i in 0..5 {
        fs::write(dir.path().join("src/js/app.js"), format!("change {i}")).unwrap();
        sleep(Duration::from_millis(20)).await;
    }

    // Well past the quiet period.
    sleep(Duration::from_millis(1200)).await;
    tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();

    let summary = timeout(Duration::from_secs(5), runtime)
        .await
        .expect("runtime did not stop")
        .unwrap()
        .unwrap();
    assert_eq!(*executed.lock().unwrap(), vec!["js".to_string()]);
    assert_eq!(summary.succeeded, 1);
}
