// src/exec/mod.rs

//! Execution layer.
//!
//! - [`command`] runs shell commands, both as whole tasks (`cmd = "..."`)
//!   and as content filters for `command` pipe stages.
//! - [`backend`] provides the `ExecutorBackend` trait the watch runtime
//!   dispatches through, and the production `RealExecutorBackend`.

pub mod backend;
pub mod command;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use command::{CommandOutput, CommandTask, run_shell};
