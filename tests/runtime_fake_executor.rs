// tests/runtime_fake_executor.rs

mod common;

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::Duration;

use taskpipe::engine::{
    CoreCommand, CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TaskOutcome, TriggerReason,
};
use taskpipe::types::TriggerWhileRunningBehaviour;
use taskpipe_test_utils::fake_executor::FakeExecutor;

use crate::common::{init_tracing, with_timeout};

fn trigger(task: &str) -> RuntimeEvent {
    RuntimeEvent::TaskTriggered {
        task: task.to_string(),
        reason: TriggerReason::FileWatch,
    }
}

fn completed(task: &str) -> RuntimeEvent {
    RuntimeEvent::TaskCompleted {
        task: task.to_string(),
        outcome: TaskOutcome::Success,
    }
}

#[test]
fn trigger_while_running_is_queued_once() {
    let mut core = CoreRuntime::new(TriggerWhileRunningBehaviour::Queue, RuntimeOptions::default());

    let step = core.step(trigger("js"));
    assert_eq!(step.commands, vec![CoreCommand::Dispatch("js".into())]);
    assert!(core.is_running("js"));

    // Three more triggers during the run collapse into one pending re-run.
    for _ in 0..3 {
        assert!(core.step(trigger("js")).commands.is_empty());
    }
    assert!(!core.queue_is_empty());

    let step = core.step(completed("js"));
    assert_eq!(step.commands, vec![CoreCommand::Dispatch("js".into())]);
    assert!(core.queue_is_empty());

    let step = core.step(completed("js"));
    assert!(step.commands.is_empty());
    assert!(core.is_idle());
    assert!(step.keep_running);
}

#[test]
fn skip_mode_drops_triggers_for_running_tasks() {
    let mut core = CoreRuntime::new(TriggerWhileRunningBehaviour::Skip, RuntimeOptions::default());

    core.step(trigger("css"));
    assert!(core.step(trigger("css")).commands.is_empty());
    assert!(core.queue_is_empty());

    let step = core.step(completed("css"));
    assert!(step.commands.is_empty());
    assert!(core.is_idle());
}

#[test]
fn independent_targets_run_side_by_side() {
    let mut core = CoreRuntime::new(TriggerWhileRunningBehaviour::Queue, RuntimeOptions::default());
    core.step(trigger("js"));
    let step = core.step(trigger("css"));
    assert_eq!(step.commands, vec![CoreCommand::Dispatch("css".into())]);
    assert!(core.is_running("js") && core.is_running("css"));
}

#[test]
fn failures_are_counted_and_watching_continues() {
    let mut core = CoreRuntime::new(TriggerWhileRunningBehaviour::Queue, RuntimeOptions::default());
    core.step(trigger("js"));
    let step = core.step(RuntimeEvent::TaskCompleted {
        task: "js".into(),
        outcome: TaskOutcome::Failed("boom".into()),
    });
    assert!(step.keep_running);
    assert_eq!(core.summary().failed, vec!["js".to_string()]);

    // A later change still re-runs it.
    let step = core.step(trigger("js"));
    assert_eq!(step.commands, vec![CoreCommand::Dispatch("js".into())]);
}

#[test]
fn exit_when_idle_stops_after_last_completion() {
    let mut core = CoreRuntime::new(
        TriggerWhileRunningBehaviour::Queue,
        RuntimeOptions {
            exit_when_idle: true,
        },
    );
    core.step(trigger("a"));
    core.step(trigger("b"));
    assert!(core.step(completed("a")).keep_running);

    let step = core.step(completed("b"));
    assert!(!step.keep_running);
    assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
}

#[test]
fn shutdown_stops_the_loop() {
    let mut core = CoreRuntime::new(TriggerWhileRunningBehaviour::Queue, RuntimeOptions::default());
    assert!(!core.step(RuntimeEvent::ShutdownRequested).keep_running);
}

#[tokio::test]
async fn runtime_dispatches_through_the_backend_and_exits_when_idle() {
    init_tracing();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed)).failing("css");

    let core = CoreRuntime::new(
        TriggerWhileRunningBehaviour::Queue,
        RuntimeOptions {
            exit_when_idle: true,
        },
    );
    let runtime = Runtime::new(core, rx, executor);

    tx.send(trigger("js")).await.unwrap();
    tx.send(trigger("css")).await.unwrap();

    let summary = with_timeout(runtime.run()).await.unwrap();

    let mut ran = executed.lock().unwrap().clone();
    ran.sort();
    assert_eq!(ran, vec!["css".to_string(), "js".to_string()]);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, vec!["css".to_string()]);
}

#[tokio::test]
async fn runtime_stops_on_shutdown_request() {
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed));
    let core = CoreRuntime::new(TriggerWhileRunningBehaviour::Queue, RuntimeOptions::default());

    let handle = tokio::spawn(Runtime::new(core, rx, executor).run());
    tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();

    let summary = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(summary.succeeded, 0);
    assert!(executed.lock().unwrap().is_empty());
}
