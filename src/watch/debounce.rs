// src/watch/debounce.rs

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::debug;

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::types::TaskName;

/// Collapse bursts of change pings into single triggers for `task`.
///
/// Trailing edge: the first ping opens a window, every further ping
/// restarts it, and one `TaskTriggered` is sent once `window` passes with
/// no ping. Returns when either channel closes.
///
/// Runs once per binding rather than over the whole notify stream, so a
/// burst under one binding never delays the trigger of another.
pub async fn debounce_triggers(
    task: TaskName,
    window: Duration,
    mut pings: mpsc::UnboundedReceiver<()>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    while pings.recv().await.is_some() {
        let mut collapsed = 1usize;
        loop {
            match timeout(window, pings.recv()).await {
                Ok(Some(())) => collapsed += 1,
                Ok(None) => {
                    // Sender gone mid-burst; still honour the burst.
                    break;
                }
                Err(_quiet) => break,
            }
        }

        debug!(task = %task, events = collapsed, "change burst settled");
        let event = RuntimeEvent::TaskTriggered {
            task: task.clone(),
            reason: TriggerReason::FileWatch,
        };
        if runtime_tx.send(event).await.is_err() {
            debug!(task = %task, "runtime gone; debouncer exiting");
            return;
        }
    }
}
