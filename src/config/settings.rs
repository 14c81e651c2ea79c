// src/config/settings.rs

use std::path::{Path, PathBuf};

/// Per-invocation settings that come from the environment / CLI rather than
/// from the TOML file.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Project root. Pipe globs, destinations and command working
    /// directories are all relative to it.
    pub root: PathBuf,
    /// Prefix prepended to every inclusion pattern (`BASEPATH`).
    pub base_path: String,
    /// Embed diagnostic detail in generated source maps (`DEBUG`).
    pub debug: bool,
}

impl Settings {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_path: String::new(),
            debug: true,
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Figure out a sensible project root from the config file location.
    ///
    /// - If the config path has a non-empty parent (e.g. "web/Taskpipe.toml"),
    ///   we use that directory.
    /// - If it's just a bare filename like "Taskpipe.toml" (parent = ""),
    ///   we fall back to the current working directory.
    pub fn root_for_config(config_path: &Path) -> PathBuf {
        match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}
