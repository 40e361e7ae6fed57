//! Output directory removal.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::SiteConfig;
use crate::log;

/// Remove `output` entirely. Returns whether anything was removed.
pub fn remove_output(output: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(output) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(output).map(|_| true),
        Ok(_) => fs::remove_file(output).map(|_| true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// `bustle clean`
pub fn clean_site(config: &SiteConfig) -> Result<()> {
    let output = &config.build.output;
    let removed = remove_output(output)
        .with_context(|| format!("failed to remove `{}`", output.display()))?;

    let shown = config.root_relative(output);
    if removed {
        log!("clean"; "removed {}", shown.display());
    } else {
        log!("clean"; "{} does not exist, nothing to do", shown.display());
    }
    Ok(())
}
