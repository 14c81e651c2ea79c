// src/watch/path_utils.rs

use std::path::Path;

/// `path` relative to `root`, with forward slashes, as match sets expect.
///
/// Tries a plain prefix strip first, then again on canonicalized paths
/// (macOS reports `/private/var/...` for `/var/...`). `None` if `path` is
/// not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(slashed(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    // Removed files cannot be canonicalized; fall back to their parent.
    let path_canon = match path.canonicalize() {
        Ok(p) => p,
        Err(_) => {
            let parent = path.parent()?.canonicalize().ok()?;
            parent.join(path.file_name()?)
        }
    };
    path_canon.strip_prefix(&root_canon).ok().map(slashed)
}

fn slashed(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_prefix() {
        let rel = relative_str(Path::new("/project"), Path::new("/project/src/js/a.js"));
        assert_eq!(rel.as_deref(), Some("src/js/a.js"));
    }

    #[test]
    fn unrelated_path_is_none() {
        assert_eq!(
            relative_str(Path::new("/project-that-does-not-exist"), Path::new("/elsewhere/a.js")),
            None
        );
    }
}
