//! Site building orchestration.
//!
//! Build pipeline phases:
//! - **Clean** - Remove the previous output tree
//! - **Prepare** - Create an empty output directory
//! - **Discover** - Find script and stylesheet entry points
//! - **Bundle** - Compile each entry point under its content-hashed name
//! - **Manifest** - Map source URLs to hashed URLs
//! - **Copy** - Copy every other source file verbatim
//! - **Rewrite** - Point HTML references at hashed assets
//! - **Finalize** - Persist the manifest, logging
//!
//! Any failure stops the build; the error names the phase that was not
//! reached. See [`phase`] for the state machine.

mod phase;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::{
    asset::{BundleOptions, ENTRY_EXTENSIONS, Manifest, bundle_entries, copy_tree, find_entry_points},
    cli::clean::remove_output,
    config::SiteConfig,
    debug, log,
    logger::ProgressLine,
    pipeline::{html_documents, rewrite_tree},
    utils::plural_count,
};

pub use phase::{BuildPhase, PhaseError, PhaseTracker};

/// Summary of a completed build.
#[derive(Debug)]
pub struct BuildReport {
    pub entry_points: usize,
    pub copied: usize,
    pub documents: usize,
    pub references: usize,
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
    pub phase: BuildPhase,
    pub elapsed: Duration,
}

/// Build the site from `config.build.source` into `config.build.output`.
///
/// Pipeline: clean -> prepare -> discover -> bundle -> manifest -> copy -> rewrite -> finalize
pub fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    let started = Instant::now();
    let build = &config.build;
    let mut tracker = PhaseTracker::new();

    tracker.advance(|| {
        remove_output(&build.output)
            .with_context(|| format!("failed to remove `{}`", build.output.display()))
    })?;

    tracker.advance(|| {
        fs::create_dir_all(&build.output)
            .with_context(|| format!("failed to create `{}`", build.output.display()))
    })?;

    let entries = tracker.advance(|| find_entry_points(&build.source))?;
    debug!("build"; "found {}", plural_count(entries.len(), "entry point"));

    let progress = (!build.quiet).then(|| ProgressLine::new(&[("bundle", entries.len()), ("html", 0)]));

    let opts = BundleOptions {
        source_dir: &build.source,
        output_dir: &build.output,
        minify: build.minify,
    };
    let bundled = tracker.advance(|| {
        bundle_entries(&entries, opts, |asset| {
            debug!("bundle"; "{}", config.root_relative(&asset.output).display());
            if let Some(p) = &progress {
                p.inc("bundle");
            }
        })
    })?;

    let manifest =
        tracker.advance(|| Manifest::from_bundle(&bundled, &build.source, &build.output))?;

    let copied = tracker.advance(|| copy_tree(&build.source, &build.output, ENTRY_EXTENSIONS))?;

    let stats = tracker.advance(|| -> Result<_> {
        let documents = html_documents(&build.output)?;
        if let Some(p) = &progress {
            p.set_total("html", documents.len());
        }
        let stats = rewrite_tree(&build.output, &documents, &manifest, |url, replaced| {
            debug!("rewrite"; "{} ({})", url, plural_count(replaced, "reference"));
            if let Some(p) = &progress {
                p.inc("html");
            }
        })?;
        Ok(stats)
    })?;

    let manifest_path = build.manifest_path();
    tracker.advance(|| manifest.write(&manifest_path))?;

    if let Some(p) = progress {
        p.finish();
    }
    tracker.advance(|| Ok::<_, anyhow::Error>(()))?;

    let elapsed = started.elapsed();
    log!(
        "build";
        "{}, {} copied, {} rewritten in {:.2?}",
        plural_count(bundled.len(), "entry point"),
        plural_count(copied, "file"),
        plural_count(stats.references, "reference"),
        elapsed
    );

    Ok(BuildReport {
        entry_points: bundled.len(),
        copied,
        documents: stats.documents,
        references: stats.references,
        manifest,
        manifest_path,
        phase: tracker.phase(),
        elapsed,
    })
}
