//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"              # Source tree (relative to site root)
//! output = "dist"             # Output tree, wiped on every build
//! manifest = "manifest.json"  # Manifest location inside the output tree
//! minify = true               # Minify scripts and stylesheets
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::utils::path::is_within;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Source directory.
    pub source: PathBuf,

    /// Build output directory.
    pub output: PathBuf,

    /// Manifest path, relative to `output`.
    pub manifest: PathBuf,

    /// Minify compiled entry points.
    pub minify: bool,

    /// Suppress progress output (CLI only).
    #[serde(skip)]
    pub quiet: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            source: "src".into(),
            output: "dist".into(),
            manifest: "manifest.json".into(),
            minify: true,
            quiet: false,
        }
    }
}

impl BuildSectionConfig {
    /// Absolute manifest path inside the output directory.
    pub fn manifest_path(&self) -> PathBuf {
        self.output.join(&self.manifest)
    }

    /// Validate normalized (absolute) paths.
    ///
    /// The clean step deletes `output` wholesale, so it must never overlap
    /// the source tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_within(&self.source, &self.output) {
            return Err(ConfigError::Validation(format!(
                "[build] source `{}` must not be inside output `{}`",
                self.source.display(),
                self.output.display()
            )));
        }
        if is_within(&self.output, &self.source) {
            return Err(ConfigError::Validation(format!(
                "[build] output `{}` must not be inside source `{}`",
                self.output.display(),
                self.source.display()
            )));
        }
        validate_manifest_path(&self.manifest)
    }
}

/// The manifest must be a plain relative path that stays inside the output.
fn validate_manifest_path(manifest: &Path) -> Result<(), ConfigError> {
    let escapes = manifest
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if manifest.file_name().is_none() || escapes {
        return Err(ConfigError::Validation(format!(
            "[build] manifest `{}` must be a relative file path inside the output directory",
            manifest.display()
        )));
    }
    Ok(())
}
