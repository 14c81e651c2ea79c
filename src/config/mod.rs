// src/config/mod.rs

//! Configuration loading and validation for taskpipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate task shapes, references and acyclicity (`validate.rs`).
//! - Carry the per-invocation settings that do not live in TOML
//!   (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    ConfigFile, ConfigSection, RawConfigFile, StageConfig, TaskConfig, TaskRefConfig, WatchConfig,
};
pub use settings::Settings;
