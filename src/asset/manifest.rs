//! Build manifest: source URL → hashed distribution URL.
//!
//! ```json
//! {
//!   "/css/site.css": "/css/site-0c7e44d2.css",
//!   "/js/app.js": "/js/app-3f2a9c1b.js"
//! }
//! ```
//!
//! Keys are root-relative to the source tree, values root-relative to the
//! output tree. Both always use `/` separators.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::bundle::BundledAsset;
use crate::utils::path::{UrlPathError, root_relative_url};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("`{0}` is not inside `{1}`")]
    OutsideRoot(PathBuf, PathBuf),

    #[error("`{0}` is not valid UTF-8 and has no URL")]
    NonUtf8Path(PathBuf),

    #[error("duplicate manifest entry for `{0}`")]
    Duplicate(String),

    #[error("failed to serialize manifest")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write manifest to `{0}`")]
    Write(PathBuf, #[source] io::Error),
}

/// Mapping from root-relative source URL to root-relative output URL.
///
/// Backed by a `BTreeMap` so serialization order never depends on
/// filesystem or hashing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest(BTreeMap<String, String>);

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the manifest from bundler output. Pure, no I/O.
    pub fn from_bundle(
        bundled: &[BundledAsset],
        source_dir: &Path,
        output_dir: &Path,
    ) -> Result<Self, ManifestError> {
        let mut manifest = Self::new();
        for asset in bundled {
            let key = url_for(&asset.source, source_dir)?;
            let value = url_for(&asset.output, output_dir)?;
            manifest.insert(key, value)?;
        }
        Ok(manifest)
    }

    /// Insert an entry, rejecting duplicate keys.
    pub fn insert(
        &mut self,
        source_url: impl Into<String>,
        dist_url: impl Into<String>,
    ) -> Result<(), ManifestError> {
        let key = source_url.into();
        if self.0.contains_key(&key) {
            return Err(ManifestError::Duplicate(key));
        }
        self.0.insert(key, dist_url.into());
        Ok(())
    }

    /// Look up the hashed URL for a root-relative source URL.
    #[inline]
    pub fn lookup(&self, source_url: &str) -> Option<&str> {
        self.0.get(source_url).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Persist the manifest at `path`, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ManifestError::Write(path.to_path_buf(), e))?;
        }
        fs::write(path, json).map_err(|e| ManifestError::Write(path.to_path_buf(), e))
    }
}

fn url_for(path: &Path, root: &Path) -> Result<String, ManifestError> {
    root_relative_url(path, root).map_err(|err| match err {
        UrlPathError::OutsideRoot => ManifestError::OutsideRoot(path.to_path_buf(), root.to_path_buf()),
        UrlPathError::NonUtf8 => ManifestError::NonUtf8Path(path.to_path_buf()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn asset(source: &str, output: &str) -> BundledAsset {
        BundledAsset {
            source: PathBuf::from(source),
            output: PathBuf::from(output),
        }
    }

    #[test]
    fn test_from_bundle() {
        let bundled = [
            asset("site/js/app.js", "out/js/app-11111111.js"),
            asset("site/style.css", "out/style-22222222.css"),
        ];
        let manifest = Manifest::from_bundle(&bundled, Path::new("site"), Path::new("out")).unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.lookup("/js/app.js"), Some("/js/app-11111111.js"));
        assert_eq!(manifest.lookup("/style.css"), Some("/style-22222222.css"));
        assert_eq!(manifest.lookup("/missing.js"), None);
    }

    #[test]
    fn test_from_bundle_outside_root() {
        let bundled = [asset("elsewhere/app.js", "out/app-11111111.js")];
        let err = Manifest::from_bundle(&bundled, Path::new("site"), Path::new("out")).unwrap_err();
        assert!(matches!(err, ManifestError::OutsideRoot(..)));
    }

    #[cfg(unix)]
    #[test]
    fn test_from_bundle_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let bundled = [BundledAsset {
            source: Path::new("site").join(OsStr::from_bytes(b"\xff.js")),
            output: PathBuf::from("out/x-11111111.js"),
        }];
        let err = Manifest::from_bundle(&bundled, Path::new("site"), Path::new("out")).unwrap_err();
        assert!(matches!(err, ManifestError::NonUtf8Path(_)));
    }

    #[test]
    fn test_insert_duplicate() {
        let mut manifest = Manifest::new();
        manifest.insert("/a.js", "/a-1.js").unwrap();
        assert!(matches!(
            manifest.insert("/a.js", "/a-2.js"),
            Err(ManifestError::Duplicate(_))
        ));
        assert_eq!(manifest.lookup("/a.js"), Some("/a-1.js"));
    }

    #[test]
    fn test_to_json_sorted() {
        let mut manifest = Manifest::new();
        manifest.insert("/z.js", "/z-1.js").unwrap();
        manifest.insert("/a.css", "/a-1.css").unwrap();

        let json = manifest.to_json().unwrap();
        assert!(json.ends_with("}\n"));
        assert!(json.find("/a.css").unwrap() < json.find("/z.js").unwrap());

        let parsed: BTreeMap<String, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.get("/z.js").map(String::as_str), Some("/z-1.js"));
    }

    #[test]
    fn test_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/manifest.json");
        let mut manifest = Manifest::new();
        manifest.insert("/a.js", "/a-1.js").unwrap();

        manifest.write(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), manifest.to_json().unwrap());
    }
}
