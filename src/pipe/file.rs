// src/pipe/file.rs

use std::path::{Path, PathBuf};

/// Path metadata of a file flowing through a pipe, split the way rename
/// rules operate on it.
///
/// `ext` keeps its leading dot and may hold several components
/// (`.min.js`); `dir` is relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMeta {
    pub dir: PathBuf,
    pub stem: String,
    pub ext: String,
}

impl PathMeta {
    pub fn from_relative(path: &Path) -> Self {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self { dir, stem, ext }
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.stem, self.ext)
    }

    pub fn to_relative(&self) -> PathBuf {
        self.dir.join(self.file_name())
    }
}

/// One file in flight: where it came from, what it is called now, and
/// its current content.
///
/// `meta` is relative to `base`, so rename rules never see the `BASEPATH`
/// prefix; [`SourceFile::relative_path`] puts it back.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Original path, relative to the project root.
    pub source: PathBuf,
    pub base: PathBuf,
    pub meta: PathMeta,
    pub contents: Vec<u8>,
    /// Names of the stages applied so far, in order.
    pub applied: Vec<String>,
}

impl SourceFile {
    pub fn new(source: PathBuf, contents: Vec<u8>) -> Self {
        Self::under_base(source, PathBuf::new(), contents)
    }

    /// A file matched below `base`. Sources outside `base` keep their full
    /// path and an empty base.
    pub fn under_base(source: PathBuf, base: PathBuf, contents: Vec<u8>) -> Self {
        let (base, meta) = match source.strip_prefix(&base) {
            Ok(rest) if !base.as_os_str().is_empty() => {
                let meta = PathMeta::from_relative(rest);
                (base, meta)
            }
            _ => (PathBuf::new(), PathMeta::from_relative(&source)),
        };
        Self {
            source,
            base,
            meta,
            contents,
            applied: Vec::new(),
        }
    }

    /// Current path relative to the project root.
    pub fn relative_path(&self) -> PathBuf {
        self.base.join(self.meta.to_relative())
    }
}
