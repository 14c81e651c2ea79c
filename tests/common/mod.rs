#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub use taskpipe_test_utils::builders;
pub use taskpipe_test_utils::{Probe, init_tracing, with_timeout};

/// Write `files` (relative path, content) under `root`, creating
/// directories as needed.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }
}

pub fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel))
        .unwrap_or_else(|e| panic!("reading {rel}: {e}"))
}

/// Write a `Taskpipe.toml` into `root` and return its path.
pub fn write_config(root: &Path, toml: &str) -> PathBuf {
    let path = root.join("Taskpipe.toml");
    fs::write(&path, toml).unwrap();
    path
}
