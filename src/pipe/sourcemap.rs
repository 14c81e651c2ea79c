// src/pipe/sourcemap.rs

//! Companion `.map` files for pipe outputs.
//!
//! Stages here are opaque, so the map cannot carry real line mappings: it
//! records which source produced the output (`sources`, rooted at `/`) and,
//! in debug mode, the task and stages that touched it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::pipe::file::SourceFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMapOptions {
    /// Include the `x_taskpipe` section listing task and applied stages.
    pub debug: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceMapV3<'a> {
    version: u8,
    file: String,
    source_root: &'a str,
    sources: Vec<String>,
    names: Vec<String>,
    mappings: &'a str,
    #[serde(rename = "x_taskpipe", skip_serializing_if = "Option::is_none")]
    debug: Option<DebugSection<'a>>,
}

#[derive(Debug, Serialize)]
struct DebugSection<'a> {
    task: &'a str,
    stages: &'a [String],
}

/// Path of the map written next to `output`.
pub fn map_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".map");
    PathBuf::from(name)
}

/// Serialize the map for `file` as produced by `task`.
pub fn render(file: &SourceFile, task: &str, opts: SourceMapOptions) -> Result<Vec<u8>> {
    let map = SourceMapV3 {
        version: 3,
        file: file.meta.file_name(),
        source_root: "/",
        sources: vec![file.source.to_string_lossy().replace('\\', "/")],
        names: Vec::new(),
        mappings: "",
        debug: opts.debug.then_some(DebugSection {
            task,
            stages: &file.applied,
        }),
    };
    serde_json::to_vec_pretty(&map).context("serializing source map")
}

/// Append a `sourceMappingURL` comment for JS and CSS outputs; other
/// content is returned unchanged.
pub fn with_reference(mut contents: Vec<u8>, ext: &str, map_file_name: &str) -> Vec<u8> {
    let comment = if ext.ends_with(".js") || ext.ends_with(".mjs") {
        format!("//# sourceMappingURL={map_file_name}\n")
    } else if ext.ends_with(".css") {
        format!("/*# sourceMappingURL={map_file_name} */\n")
    } else {
        return contents;
    };

    if !contents.is_empty() && !contents.ends_with(b"\n") {
        contents.push(b'\n');
    }
    contents.extend_from_slice(comment.as_bytes());
    contents
}
