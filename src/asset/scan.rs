//! Source tree scanning (pure, read-only).
//!
//! ```text
//! src/
//! ├── index.html          -> walked, copied
//! ├── css/site.css        -> walked, entry point
//! └── js/app.js           -> walked, entry point
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use thiserror::Error;

/// Extensions selected for hashed compilation (compared case-insensitively).
pub const ENTRY_EXTENSIONS: &[&str] = &["js", "css"];

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("directory `{0}` does not exist or is not a directory")]
    Missing(PathBuf),

    #[error("failed to read directory tree under `{0}`")]
    Walk(PathBuf, #[source] jwalk::Error),

    #[error("cannot resolve symbolic link `{0}`")]
    Link(PathBuf, #[source] io::Error),

    #[error("symbolic link `{0}` points at a directory, which is not followed")]
    LinkedDir(PathBuf),
}

/// Collect every file under `dir` recursively.
///
/// Directories are traversed but never returned. Hidden files are included
/// and results are sorted by path so a given tree always walks the same way.
/// A symbolic link to a file is returned under the link's own path; a link
/// to a directory, or one that does not resolve, is an error.
pub fn walk_files(dir: &Path) -> Result<Vec<PathBuf>, WalkError> {
    if !dir.is_dir() {
        return Err(WalkError::Missing(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort(true).skip_hidden(false) {
        let entry = entry.map_err(|err| WalkError::Walk(dir.to_path_buf(), err))?;
        let file_type = entry.file_type();
        if file_type.is_file() {
            files.push(entry.path());
        } else if file_type.is_symlink() {
            let path = entry.path();
            let target = fs::metadata(&path).map_err(|err| WalkError::Link(path.clone(), err))?;
            if target.is_dir() {
                return Err(WalkError::LinkedDir(path));
            }
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Check whether `path` has one of `extensions` (case-insensitive, no dot).
///
/// Files without an extension never match.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
}

/// Select the files under `source` eligible for hashed compilation.
pub fn find_entry_points(source: &Path) -> Result<Vec<PathBuf>, WalkError> {
    Ok(walk_files(source)?
        .into_iter()
        .filter(|path| has_extension(path, ENTRY_EXTENSIONS))
        .collect())
}
