//! Verbatim copying of non-compiled assets.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::scan::{WalkError, has_extension, walk_files};

#[derive(Debug, Error)]
pub enum CopyError {
    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("failed to copy `{0}` to `{1}`")]
    Copy(PathBuf, PathBuf, #[source] io::Error),

    #[error("failed to create directory `{0}`")]
    CreateDir(PathBuf, #[source] io::Error),
}

/// Copy every file under `src` into `dest`, preserving relative paths.
///
/// Files whose extension is listed in `excluded` (case-insensitive, without
/// the dot) are skipped. Files without an extension are always copied.
///
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dest: &Path, excluded: &[&str]) -> Result<usize, CopyError> {
    let mut count = 0;

    for path in walk_files(src)? {
        if has_extension(&path, excluded) {
            continue;
        }

        // walk_files only yields paths below `src`
        let rel = path.strip_prefix(src).unwrap_or(&path);
        let target = dest.join(rel);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| CopyError::CreateDir(parent.to_path_buf(), e))?;
        }
        fs::copy(&path, &target).map_err(|e| CopyError::Copy(path.clone(), target.clone(), e))?;
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("img/icons")).unwrap();
        fs::create_dir_all(src.join("js")).unwrap();
        fs::write(src.join("index.html"), "<html></html>").unwrap();
        fs::write(src.join("img/logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
        fs::write(src.join("img/icons/fav.ico"), "ico").unwrap();
        fs::write(src.join("js/app.js"), "let a = 1;").unwrap();
        fs::write(src.join("js/legacy.JS"), "var b = 2;").unwrap();
        fs::write(src.join("CNAME"), "example.com").unwrap();
        dir
    }

    #[test]
    fn test_copy_tree_excludes_extensions() {
        let dir = setup();
        let src = dir.path().join("src");
        let dest = dir.path().join("dist");

        let count = copy_tree(&src, &dest, &["js", "css"]).unwrap();

        assert_eq!(count, 4);
        assert!(dest.join("index.html").exists());
        assert!(dest.join("img/icons/fav.ico").exists());
        assert!(dest.join("CNAME").exists());
        assert!(!dest.join("js/app.js").exists());
        assert!(!dest.join("js/legacy.JS").exists());
    }

    #[test]
    fn test_copy_tree_is_byte_identical() {
        let dir = setup();
        let src = dir.path().join("src");
        let dest = dir.path().join("dist");

        copy_tree(&src, &dest, &[]).unwrap();

        assert_eq!(
            fs::read(src.join("img/logo.png")).unwrap(),
            fs::read(dest.join("img/logo.png")).unwrap()
        );
        assert_eq!(fs::read(dest.join("js/app.js")).unwrap(), b"let a = 1;");
    }

    #[test]
    fn test_copy_tree_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = copy_tree(&dir.path().join("missing"), &dir.path().join("dist"), &[]).unwrap_err();
        assert!(matches!(err, CopyError::Walk(WalkError::Missing(_))));
    }
}
