//! Filesystem path normalization.
//!
//! - `normalize_path` - absolute path (canonicalize + lexical fallback)
//! - `is_within` - containment check on normalized paths

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`). Paths that
/// do not exist yet (the output directory before the first build) are made
/// absolute against the current directory and cleaned lexically.
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };
    clean(&absolute)
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Whether `inner` equals `outer` or lies below it.
pub fn is_within(inner: &Path, outer: &Path) -> bool {
    inner.starts_with(outer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("does/not/exist/../here"));
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("does/not/here"));
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_is_within() {
        assert!(is_within(Path::new("/site/src/dist"), Path::new("/site/src")));
        assert!(is_within(Path::new("/site/src"), Path::new("/site/src")));
        assert!(!is_within(Path::new("/site/src2"), Path::new("/site/src")));
        assert!(!is_within(Path::new("/site"), Path::new("/site/src")));
    }
}
