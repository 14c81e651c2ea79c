// src/pipe/rename.rs

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::pipe::file::PathMeta;

/// A single path rewrite applied by a rename stage.
///
/// In TOML, unit rules are bare strings and the others are one-key tables:
///
/// ```toml
/// rename = [
///   { relocate = { from = "src", to = "dist" } },
///   "lowercase",
///   { prefix = "ensemble-" },
///   { extension_prefix = ".min" },
/// ]
/// ```
///
/// Every rule is idempotent: applying it to its own output changes nothing.
/// Prefix, suffix and extension-prefix rules check for the text before
/// adding it, and relocation only fires while the path still starts with
/// the `from` directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameRule {
    /// Replace the leading directory component `from` with `to`.
    Relocate { from: String, to: String },
    /// Lowercase the file stem.
    Lowercase,
    Prefix(String),
    Suffix(String),
    /// Insert an extension component in front of the current one
    /// (`foo.js` -> `foo.min.js`).
    ExtensionPrefix(String),
    /// Replace the whole extension.
    Extension(String),
}

impl RenameRule {
    pub fn apply(&self, meta: &PathMeta) -> PathMeta {
        let mut out = meta.clone();
        match self {
            RenameRule::Relocate { from, to } => {
                out.dir = relocate(&meta.dir, from, to);
            }
            RenameRule::Lowercase => {
                out.stem = meta.stem.to_lowercase();
            }
            RenameRule::Prefix(prefix) => {
                if !meta.stem.starts_with(prefix.as_str()) {
                    out.stem = format!("{prefix}{}", meta.stem);
                }
            }
            RenameRule::Suffix(suffix) => {
                if !meta.stem.ends_with(suffix.as_str()) {
                    out.stem = format!("{}{suffix}", meta.stem);
                }
            }
            RenameRule::ExtensionPrefix(part) => {
                let part = dotted(part);
                let present = meta.ext.starts_with(&format!("{part}."))
                    || meta.ext == part
                    || meta.stem.ends_with(&part);
                if !present {
                    out.ext = format!("{part}{}", meta.ext);
                }
            }
            RenameRule::Extension(ext) => {
                out.ext = dotted(ext);
            }
        }
        out
    }
}

/// Apply `rules` left to right.
pub fn apply_all(rules: &[RenameRule], meta: &PathMeta) -> PathMeta {
    rules.iter().fold(meta.clone(), |acc, rule| rule.apply(&acc))
}

fn relocate(dir: &Path, from: &str, to: &str) -> PathBuf {
    let mut comps = dir.components();
    match comps.next() {
        Some(Component::Normal(first)) if first == OsStr::new(from) => {
            let mut out = PathBuf::from(to);
            let rest = comps.as_path();
            if !rest.as_os_str().is_empty() {
                out.push(rest);
            }
            out
        }
        _ => dir.to_path_buf(),
    }
}

fn dotted(ext: &str) -> String {
    if ext.is_empty() || ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}
