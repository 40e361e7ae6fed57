//! Per-file compilation with content-hashed output names.
//!
//! ```text
//! src/js/app.js      -> dist/js/app-3f2a9c1b.js
//! src/css/site.css   -> dist/css/site-0c7e44d2.css
//! ```
//!
//! The hash covers the compiled bytes, so unchanged files keep their names
//! across rebuilds and only edited files get new URLs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::compile::compile_entry;
use crate::utils::hash;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read entry point `{0}`")]
    Read(PathBuf, #[source] io::Error),

    #[error("failed to compile `{path}`: {message}")]
    Compile { path: PathBuf, message: String },

    #[error("entry point `{0}` is outside the source directory")]
    OutsideSource(PathBuf),

    #[error("entry point `{0}` has a name that is not valid UTF-8")]
    NonUtf8Path(PathBuf),

    #[error("failed to write `{0}`")]
    Write(PathBuf, #[source] io::Error),
}

/// A compiled entry point and where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledAsset {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// Options shared by every entry point of a bundle run.
#[derive(Debug, Clone, Copy)]
pub struct BundleOptions<'a> {
    pub source_dir: &'a Path,
    pub output_dir: &'a Path,
    pub minify: bool,
}

/// Build the hashed file name `<stem>-<hash>.<ext>`.
///
/// # Examples
/// ```ignore
/// assert_eq!(hashed_name(Path::new("js/app.js"), "3f2a9c1b"), Some("app-3f2a9c1b.js".into()));
/// ```
pub fn hashed_name(path: &Path, hash: &str) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    Some(format!("{stem}-{hash}.{ext}"))
}

/// Compile a single entry point and write it under its hashed name.
pub fn bundle_entry(entry: &Path, opts: BundleOptions<'_>) -> Result<BundledAsset, BundleError> {
    let bytes = fs::read(entry).map_err(|e| BundleError::Read(entry.to_path_buf(), e))?;
    let source = String::from_utf8(bytes).map_err(|_| BundleError::Compile {
        path: entry.to_path_buf(),
        message: "source is not valid UTF-8".to_string(),
    })?;

    let compiled =
        compile_entry(entry, &source, opts.minify).map_err(|message| BundleError::Compile {
            path: entry.to_path_buf(),
            message,
        })?;

    let fingerprint = hash::fingerprint(&compiled);
    let rel = entry
        .strip_prefix(opts.source_dir)
        .map_err(|_| BundleError::OutsideSource(entry.to_path_buf()))?;
    // Entry points always carry an extension, so only the stem can fail
    let file_name =
        hashed_name(rel, &fingerprint).ok_or_else(|| BundleError::NonUtf8Path(entry.to_path_buf()))?;

    let output = match rel.parent() {
        Some(parent) => opts.output_dir.join(parent).join(file_name),
        None => opts.output_dir.join(file_name),
    };

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| BundleError::Write(parent.to_path_buf(), e))?;
    }
    fs::write(&output, compiled).map_err(|e| BundleError::Write(output.clone(), e))?;

    Ok(BundledAsset {
        source: entry.to_path_buf(),
        output,
    })
}

/// Compile every entry point, stopping at the first failure.
///
/// `on_entry` is called after each successful entry (progress reporting).
pub fn bundle_entries(
    entries: &[PathBuf],
    opts: BundleOptions<'_>,
    mut on_entry: impl FnMut(&BundledAsset),
) -> Result<Vec<BundledAsset>, BundleError> {
    let mut bundled = Vec::with_capacity(entries.len());
    for entry in entries {
        let asset = bundle_entry(entry, opts)?;
        on_entry(&asset);
        bundled.push(asset);
    }
    Ok(bundled)
}
