// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::pipe::MatchSet;
use crate::watch::binding::WatchBinding;
use crate::watch::debounce::debounce_triggers;
use crate::watch::path_utils::relative_str;

/// Keeps the underlying `RecommendedWatcher` alive. Dropping it stops
/// file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` recursively and send a debounced
/// `RuntimeEvent::TaskTriggered` for every binding whose match set selects
/// a created, modified or removed path.
///
/// Each binding gets its own debouncer, so bindings never delay each
/// other.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    bindings: &[WatchBinding],
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    debounce: Duration,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    let mut routes: Vec<(MatchSet, mpsc::UnboundedSender<()>)> = Vec::new();
    for binding in bindings {
        let (ping_tx, ping_rx) = mpsc::unbounded_channel();
        tokio::spawn(debounce_triggers(
            binding.key().to_string(),
            debounce,
            ping_rx,
            runtime_tx.clone(),
        ));
        routes.push((binding.match_set().clone(), ping_tx));
    }
    let routes = Arc::new(routes);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("taskpipe: failed to forward notify event: {err}");
                }
            }
            Err(err) => eprintln!("taskpipe: file watch error: {err}"),
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!(root = %root.display(), bindings = bindings.len(), "file watcher started");

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !(event.kind.is_create() || event.kind.is_modify() || event.kind.is_remove()) {
                continue;
            }
            for path in &event.paths {
                let Some(rel) = relative_str(&root, path) else {
                    debug!(path = %path.display(), "event outside watch root");
                    continue;
                };
                for (match_set, ping) in routes.iter() {
                    if match_set.matches(&rel) && ping.send(()).is_err() {
                        warn!(path = %rel, "debouncer stopped; change dropped");
                    }
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
