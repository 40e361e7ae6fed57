//! Site configuration management for `bustle.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── build.rs   # [build] section
//! ├── error.rs   # ConfigError
//! └── mod.rs     # SiteConfig (this file)
//! ```
//!
//! The config file is optional. Without one, defaults apply and paths are
//! resolved against the current directory.

mod build;
mod error;

pub use build::BuildSectionConfig;
pub use error::ConfigError;

use crate::{
    cli::{BuildArgs, Cli, Commands},
    log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file searched for when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "bustle.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing bustle.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory - parent of config file or cwd (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildSectionConfig,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for `bustle.toml` unless `--config` is given.
    /// The project root is the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = Self::resolve_config_path(cli)?;

        let mut config = match &config_path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };

        let root = match config_path.as_deref().and_then(Path::parent) {
            Some(parent) => parent.to_path_buf(),
            None => std::env::current_dir().context("Failed to get current working directory")?,
        };

        config.config_path = config_path;
        config.apply_command_options(cli);
        config.normalize_paths(&root);
        config.build.validate()?;

        Ok(config)
    }

    /// Resolve the config file path.
    ///
    /// An explicit `--config` must exist; the implicit default may be absent.
    fn resolve_config_path(cli: &Cli) -> Result<Option<PathBuf>> {
        match &cli.config {
            Some(path) if path.is_file() => Ok(Some(normalize_path(path))),
            Some(path) => Err(ConfigError::Io(
                path.clone(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
            )
            .into()),
            None => Ok(find_config_file(Path::new(DEFAULT_CONFIG))),
        }
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} (ignored): {}", display_path, fields.join(", "));
    }

    /// Apply command-specific CLI overrides.
    fn apply_command_options(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
            Commands::Clean { output } => {
                Self::update_option(&mut self.build.output, output.as_ref());
            }
        }
    }

    fn apply_build_args(&mut self, args: &BuildArgs) {
        Self::update_option(&mut self.build.source, args.source.as_ref());
        Self::update_option(&mut self.build.output, args.output.as_ref());
        Self::update_option(&mut self.build.minify, args.minify.as_ref());
        self.build.quiet = args.quiet;
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.build.source = normalize_path(&root.join(&self.build.source));
        self.build.output = normalize_path(&root.join(&self.build.output));
        self.root = root;
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Get path relative to the site root, for display
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }
}

/// Find config file by searching upward from current directory
///
/// ```text
/// /home/user/site/src/blog/  ← cwd
/// /home/user/site/bustle.toml ← found!
/// ```
fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// tests
// ============================================================================
