// src/pipe/matchset.rs

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};

use crate::fs::FileSystem;

/// An ordered set of inclusion patterns plus exclusion patterns.
///
/// Patterns are globs relative to the project root, written with forward
/// slashes. In the pattern list handed to [`MatchSet::from_patterns`], an
/// entry starting with `!` is an exclusion; everything else is an inclusion.
///
/// - `*` and `?` do not cross `/`; `**` matches any number of directories.
/// - Inclusion patterns are anchored at the root.
/// - Exclusion patterns are unanchored: `!node_modules/**/*.js` excludes
///   `node_modules/a.js` as well as `src/js/node_modules/a.js`. Prefix the
///   pattern with `/` (`!/vendor/**`) to anchor it at the root.
/// - Exclusions always win over inclusions, wherever they appear in the
///   list.
#[derive(Clone)]
pub struct MatchSet {
    base: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
    include_globs: Vec<GlobMatcher>,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for MatchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchSet")
            .field("base", &self.base)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .finish_non_exhaustive()
    }
}

impl MatchSet {
    /// Build a match set from a mixed pattern list (`!` marks exclusions).
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        Self::from_patterns_with_base(patterns, "")
    }

    /// Like [`MatchSet::from_patterns`], but prepend `base_path` to every
    /// inclusion pattern. Exclusions are left as written. The base is kept so
    /// pipes can rename files relative to it.
    pub fn from_patterns_with_base<S: AsRef<str>>(patterns: &[S], base_path: &str) -> Result<Self> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for pat in patterns {
            let pat = pat.as_ref().trim();
            if let Some(ex) = pat.strip_prefix('!') {
                exclude.push(ex.to_string());
            } else if !pat.is_empty() {
                include.push(format!("{base_path}{pat}"));
            }
        }

        let mut set = Self::new(include, exclude)?;
        set.base = PathBuf::from(base_path);
        Ok(set)
    }

    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Result<Self> {
        let include_globs = include
            .iter()
            .map(|pat| compile(pat).map(|g| g.compile_matcher()))
            .collect::<Result<Vec<_>>>()?;

        let exclude_set = if exclude.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pat in &exclude {
                for variant in exclusion_variants(pat) {
                    builder.add(compile(&variant)?);
                }
            }
            Some(builder.build().context("building exclude globset")?)
        };

        Ok(Self {
            base: PathBuf::new(),
            include,
            exclude,
            include_globs,
            exclude_set,
        })
    }

    /// The `BASEPATH` prefix the inclusion patterns were built with.
    pub fn base_path(&self) -> &Path {
        &self.base
    }

    pub fn include_patterns(&self) -> &[String] {
        &self.include
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude
    }

    /// Returns true if `rel_path` (relative to the root, forward slashes)
    /// is selected by this set.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.include_index(rel_path).is_some()
    }

    /// Index of the first inclusion pattern selecting `rel_path`, unless an
    /// exclusion removes it.
    fn include_index(&self, rel_path: &str) -> Option<usize> {
        let idx = self.include_globs.iter().position(|g| g.is_match(rel_path))?;
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return None;
            }
        }
        Some(idx)
    }

    /// Literal directory prefixes of the inclusion patterns
    /// (`src/js/**/*.js` -> `src/js`). Walking only these keeps resolution
    /// away from unrelated trees such as `node_modules`.
    pub fn base_dirs(&self) -> Vec<PathBuf> {
        let mut bases: Vec<PathBuf> = Vec::new();
        for pat in &self.include {
            let base = literal_base(pat);
            if !bases.contains(&base) {
                bases.push(base);
            }
        }
        bases
    }

    /// Resolve the set against the filesystem under `root`.
    ///
    /// Returns paths relative to `root`, grouped by the first inclusion
    /// pattern that selected them (in declaration order) and sorted within
    /// each group. A set that matches nothing yields an empty list.
    pub fn resolve(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut hits: Vec<(usize, String)> = Vec::new();

        for base in self.base_dirs() {
            let start = if base.as_os_str().is_empty() {
                root.to_path_buf()
            } else {
                root.join(&base)
            };

            let mut stack = vec![start];
            while let Some(path) = stack.pop() {
                if fs.is_dir(&path) {
                    stack.extend(fs.read_dir(&path)?);
                } else if fs.is_file(&path) {
                    let Some(rel) = relative_to(root, &path) else {
                        continue;
                    };
                    if seen.contains(&rel) {
                        continue;
                    }
                    if let Some(idx) = self.include_index(&rel) {
                        seen.insert(rel.clone());
                        hits.push((idx, rel));
                    }
                }
            }
        }

        hits.sort();
        Ok(hits.into_iter().map(|(_, rel)| PathBuf::from(rel)).collect())
    }
}

fn compile(pattern: &str) -> Result<globset::Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))
}

fn exclusion_variants(pattern: &str) -> Vec<String> {
    if let Some(anchored) = pattern.strip_prefix('/') {
        vec![anchored.to_string()]
    } else if pattern.starts_with("**/") {
        vec![pattern.to_string()]
    } else {
        vec![pattern.to_string(), format!("**/{pattern}")]
    }
}

fn literal_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    let segments: Vec<&str> = pattern.split('/').collect();
    // The last segment names files, never a directory to descend from.
    for seg in &segments[..segments.len().saturating_sub(1)] {
        if seg.contains(['*', '?', '[', '{']) {
            break;
        }
        if !seg.is_empty() && *seg != "." {
            base.push(seg);
        }
    }
    base
}

fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}
