//! HTML reference rewriting.
//!
//! Rewrites `link[href]` and `script[src]` values that resolve to a manifest
//! key:
//!
//! ```text
//! /blog/post/index.html:  <link href="../style.css">
//!                     ->  <link href="/blog/style-0c7e44d2.css">
//! ```
//!
//! Start tags are found with [`crate::utils::html::start_tags`], which
//! reports the byte range of every attribute value. Only the ranges of
//! rewritten values are replaced, so every other byte of the document is
//! preserved exactly. Markup inside `script`, `style`, `textarea` and
//! `title` bodies is text and never rewritten.

use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::asset::Manifest;
use crate::asset::scan::{WalkError, has_extension, walk_files};
use crate::utils::html::start_tags;
use crate::utils::path::route::decode_url;
use crate::utils::path::{UrlPathError, resolve_reference, root_relative_url};

/// Extensions treated as HTML documents.
pub const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// Element name → reference-bearing attribute.
const REFERENCE_ATTRS: &[(&str, &str)] = &[("link", "href"), ("script", "src")];

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("failed to parse HTML document `{document}`: {message}")]
    Parse { document: String, message: String },

    #[error("failed to read `{0}`")]
    Read(PathBuf, #[source] io::Error),

    #[error("failed to write `{0}`")]
    Write(PathBuf, #[source] io::Error),

    #[error("document `{0}` is outside the output directory")]
    OutsideOutput(PathBuf),

    #[error("document path `{0}` is not valid UTF-8")]
    NonUtf8Path(PathBuf),
}

/// Result of rewriting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub html: String,
    /// Number of attribute values replaced.
    pub replaced: usize,
}

/// Totals for a whole output tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub documents: usize,
    pub references: usize,
}

/// Rewrite references in `html`, located at root-relative URL `document`.
pub fn rewrite_html(html: &str, document: &str, manifest: &Manifest) -> Rewritten {
    let mut edits: Vec<(Range<usize>, &str)> = Vec::new();
    for tag in start_tags(html) {
        let Some(&(_, attr)) = REFERENCE_ATTRS.iter().find(|(element, _)| tag.is(element)) else {
            continue;
        };
        let Some(attribute) = tag.attribute(attr) else {
            continue;
        };
        let Some(value) = attribute.value else {
            continue;
        };
        if let Some(target) = lookup_reference(document, value, manifest) {
            edits.push((attribute.span.clone(), target));
        }
    }

    if edits.is_empty() {
        return Rewritten {
            html: html.to_string(),
            replaced: 0,
        };
    }

    // Tags come in document order, so spans are already sorted
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    for (span, target) in &edits {
        out.push_str(&html[cursor..span.start]);
        let quoted = span.start > 0 && matches!(html.as_bytes()[span.start - 1], b'"' | b'\'');
        if quoted || !target.bytes().any(needs_quotes) {
            out.push_str(target);
        } else {
            out.push('"');
            out.push_str(target);
            out.push('"');
        }
        cursor = span.end;
    }
    out.push_str(&html[cursor..]);

    Rewritten {
        html: out,
        replaced: edits.len(),
    }
}

/// Bytes that cannot appear in an unquoted attribute value.
fn needs_quotes(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c | b'"' | b'\'' | b'=' | b'<' | b'>' | b'`')
}

/// Resolve an attribute value and look it up in the manifest.
fn lookup_reference<'m>(document: &str, value: &str, manifest: &'m Manifest) -> Option<&'m str> {
    let url = resolve_reference(document, value)?;
    manifest
        .lookup(&url)
        .or_else(|| decode_url(&url).and_then(|decoded| manifest.lookup(&decoded)))
}

/// Rewrite `documents` (HTML files under `output_dir`) in place.
///
/// `on_document` is called once per processed document with its URL and
/// the number of replaced references.
pub fn rewrite_tree(
    output_dir: &Path,
    documents: &[PathBuf],
    manifest: &Manifest,
    mut on_document: impl FnMut(&str, usize),
) -> Result<RewriteStats, RewriteError> {
    let mut stats = RewriteStats::default();

    for path in documents {
        let document = root_relative_url(path, output_dir).map_err(|err| match err {
            UrlPathError::OutsideRoot => RewriteError::OutsideOutput(path.clone()),
            UrlPathError::NonUtf8 => RewriteError::NonUtf8Path(path.clone()),
        })?;

        let bytes = fs::read(path).map_err(|e| RewriteError::Read(path.clone(), e))?;
        let html = String::from_utf8(bytes).map_err(|_| RewriteError::Parse {
            document: document.clone(),
            message: "document is not valid UTF-8".to_string(),
        })?;

        let rewritten = rewrite_html(&html, &document, manifest);
        if rewritten.replaced > 0 {
            fs::write(path, &rewritten.html).map_err(|e| RewriteError::Write(path.clone(), e))?;
        }

        stats.documents += 1;
        stats.references += rewritten.replaced;
        on_document(&document, rewritten.replaced);
    }

    Ok(stats)
}

/// All HTML documents under `dir`.
pub fn html_documents(dir: &Path) -> Result<Vec<PathBuf>, WalkError> {
    Ok(walk_files(dir)?
        .into_iter()
        .filter(|path| has_extension(path, HTML_EXTENSIONS))
        .collect())
}
