// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `taskpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskpipe",
    version,
    about = "Run build task graphs: file pipes, shell commands, series and parallel composites.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML). Its directory is the project root.
    #[arg(long, global = true, value_name = "PATH", default_value = "Taskpipe.toml")]
    pub config: String,

    /// Prefix prepended to every inclusion pattern.
    #[arg(long, global = true, env = "BASEPATH", value_name = "PREFIX", default_value = "")]
    pub base_path: String,

    /// Embed task and stage detail in generated source maps.
    #[arg(
        long,
        global = true,
        env = "DEBUG",
        value_name = "BOOL",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub debug: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKPIPE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a task (and everything it composes) once.
    Run {
        #[arg(default_value = "default")]
        task: String,
    },
    /// Re-run bound tasks whenever their watched files change.
    Watch {
        /// Trigger every binding once, wait for them, and exit.
        #[arg(long)]
        once: bool,
    },
    /// Print tasks and watch bindings without running anything.
    List,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
