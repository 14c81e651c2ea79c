// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipe;
pub mod task;
pub mod types;
pub mod watch;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::{CliArgs, Command};
use crate::config::{ConfigFile, Settings, load_and_validate};
use crate::engine::{CoreRuntime, RunSummary, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::exec::RealExecutorBackend;
use crate::fs::RealFileSystem;
use crate::task::{TaskRegistry, TaskRunner};
use crate::watch::{WatchBinding, bindings_from_config, spawn_watcher};

pub use crate::errors::TaskpipeError;
pub use crate::task::{Task, TaskBody};

/// Slots in the runtime event channel beyond one per watch target.
const RUNTIME_EVENT_CAPACITY: usize = 64;

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let settings = Settings::new(Settings::root_for_config(&config_path))
        .with_base_path(args.base_path.clone())
        .with_debug(args.debug);

    match args.command {
        Command::Run { task } => run_task(&cfg, &settings, &task).await,
        Command::Watch { once } => {
            let summary = run_watch(&cfg, &settings, once).await?;
            if !summary.failed.is_empty() {
                bail!("watched tasks failed: {}", summary.failed.join(", "));
            }
            Ok(())
        }
        Command::List => {
            print_task_list(&cfg, &settings);
            Ok(())
        }
    }
}

/// Build the registry for `cfg` and run `name` once.
pub async fn run_task(cfg: &ConfigFile, settings: &Settings, name: &str) -> Result<()> {
    let registry = TaskRegistry::from_config(cfg, settings, Arc::new(RealFileSystem))?;
    if !registry.contains(name) {
        let known: Vec<&str> = registry.names().collect();
        bail!("unknown task '{name}' (known tasks: {})", known.join(", "));
    }
    let runner = TaskRunner::new(registry);
    runner.run_named(name).await?;
    Ok(())
}

/// Run the watch runtime until Ctrl-C, or, with `once`, trigger every
/// binding once and return when they are all done.
pub async fn run_watch(cfg: &ConfigFile, settings: &Settings, once: bool) -> Result<RunSummary> {
    let registry = TaskRegistry::from_config(cfg, settings, Arc::new(RealFileSystem))?;
    let runner = TaskRunner::new(registry);

    let bindings = bindings_from_config(cfg, settings)?;
    if bindings.is_empty() {
        bail!("no [[watch]] bindings configured");
    }
    let targets: HashMap<_, _> = bindings
        .iter()
        .map(|b| (b.key().to_string(), b.task().clone()))
        .collect();

    // `--once` queues one trigger per target before the runtime starts
    // draining, so every target needs a slot.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(targets.len() + RUNTIME_EVENT_CAPACITY);
    let executor = RealExecutorBackend::new(runner, targets.clone(), rt_tx.clone());

    let _watcher_handle = if once {
        None
    } else {
        Some(spawn_watcher(
            settings.root.clone(),
            &bindings,
            rt_tx.clone(),
            Duration::from_millis(cfg.config_section().debounce_ms),
        )?)
    };

    // Ctrl-C -> graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    if once {
        let mut keys: Vec<&String> = targets.keys().collect();
        keys.sort();
        info!(?keys, "triggering every watch binding once");
        for key in keys {
            rt_tx
                .send(RuntimeEvent::TaskTriggered {
                    task: key.clone(),
                    reason: TriggerReason::Manual,
                })
                .await?;
        }
    }

    let core = CoreRuntime::new(
        cfg.config_section().triggered_while_running,
        RuntimeOptions {
            exit_when_idle: once,
        },
    );
    let summary = Runtime::new(core, rt_rx, executor).run().await?;
    Ok(summary)
}

/// Print tasks, their kinds and the watch bindings.
fn print_task_list(cfg: &ConfigFile, settings: &Settings) {
    println!("taskpipe tasks");
    println!("  root = {}", settings.root.display());
    if !settings.base_path.is_empty() {
        println!("  base_path = {}", settings.base_path);
    }
    println!();

    println!("tasks ({}):", cfg.tasks().len());
    for (name, task) in cfg.tasks() {
        let kind = task.body_kinds().first().copied().unwrap_or("?");
        println!("  - {name} [{kind}]");
        if let Some(desc) = &task.description {
            println!("      {desc}");
        }
        if let Some(cmd) = &task.cmd {
            println!("      cmd: {cmd}");
        }
        if let Some(src) = &task.src {
            println!("      src: {src:?}");
            if !task.stages.is_empty() {
                println!("      stages: {}", task.stages.len());
            }
            if let Some(dest) = &task.dest {
                println!("      dest: {dest}");
            }
            if task.sourcemaps {
                println!("      sourcemaps: true");
            }
        }
        let refs = task.referenced_tasks();
        if !refs.is_empty() {
            println!("      runs: {}", refs.join(", "));
        }
    }

    match bindings_from_config(cfg, settings) {
        Ok(bindings) => print_bindings(&bindings),
        Err(err) => println!("watch: <invalid: {err}>"),
    }
}

fn print_bindings(bindings: &[WatchBinding]) {
    if bindings.is_empty() {
        return;
    }
    println!();
    println!("watch ({}):", bindings.len());
    for b in bindings {
        println!("  - {:?} -> {}", b.match_set().include_patterns(), b.key());
    }
}
