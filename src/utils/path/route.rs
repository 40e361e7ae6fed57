//! Root-relative URL utilities.
//!
//! All manifest keys and values use `/` separators regardless of the host,
//! so resolution is done on URL segments, never on `std::path` semantics:
//! - Link classification (`is_external_link`, `is_data_url`)
//! - Reference resolution against a document (`resolve_reference`)
//! - Conversion of filesystem paths into root-relative URLs (`root_relative_url`)

use std::path::{Component, Path};

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Check if a link is external (has a URL scheme like http:, mailto:, etc.)
///
/// A valid scheme must:
/// - Have at least 1 character before the colon
/// - Start with an ASCII letter
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
///
/// # Examples
/// ```ignore
/// assert!(is_external_link("https://example.com"));
/// assert!(is_external_link("HTTP://example.com"));
/// assert!(!is_external_link("/about"));
/// assert!(!is_external_link("./file.txt"));
/// ```
#[inline]
pub fn is_external_link(link: &str) -> bool {
    link.find(':').is_some_and(|pos| {
        let scheme = &link[..pos];
        scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Check if a link is protocol-relative (`//cdn.example.com/app.js`).
#[inline]
pub fn is_protocol_relative(link: &str) -> bool {
    link.starts_with("//")
}

/// Check if a link is an inline `data:` URL (case-insensitive).
#[inline]
pub fn is_data_url(link: &str) -> bool {
    link.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("data:"))
}

/// Resolve an attribute value to a root-relative URL.
///
/// `document` is the root-relative URL of the referencing document
/// (e.g. `/blog/post/index.html`). Returns `None` for references that
/// never take part in manifest lookup: empty values, external and
/// protocol-relative URLs, and `data:` URLs.
///
/// # Examples
/// ```ignore
/// assert_eq!(resolve_reference("/blog/post/index.html", "../style.css"),
///            Some("/blog/style.css".into()));
/// assert_eq!(resolve_reference("/index.html", "/app.js"), Some("/app.js".into()));
/// ```
pub fn resolve_reference(document: &str, value: &str) -> Option<String> {
    if value.is_empty()
        || is_protocol_relative(value)
        || is_external_link(value)
        || is_data_url(value)
    {
        return None;
    }

    if value.starts_with('/') {
        return Some(value.to_string());
    }

    let base = document_dir(document);
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in value.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut resolved = format!("/{}", segments.join("/"));
    // Keep a trailing slash when the reference names a directory.
    if value.ends_with('/') && resolved.len() > 1 {
        resolved.push('/');
    }
    Some(resolved)
}

/// Directory part of a root-relative document URL, always ending with `/`.
fn document_dir(document: &str) -> &str {
    match document.rfind('/') {
        Some(pos) => &document[..=pos],
        None => "/",
    }
}

/// Percent-decode a root-relative URL, returning `None` if nothing changed
/// or the decoded bytes are not UTF-8.
pub fn decode_url(url: &str) -> Option<String> {
    if !url.contains('%') {
        return None;
    }
    let decoded = percent_decode_str(url).decode_utf8().ok()?;
    (decoded != url).then(|| decoded.into_owned())
}

/// Why a filesystem path has no root-relative URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UrlPathError {
    #[error("path is not inside the root directory")]
    OutsideRoot,

    #[error("path is not valid UTF-8")]
    NonUtf8,
}

/// Convert `path` into a root-relative URL under `root`.
///
/// Components are joined with `/` regardless of the host separator.
///
/// # Examples
/// ```ignore
/// let url = root_relative_url(Path::new("dist/css/site.css"), Path::new("dist"));
/// assert_eq!(url, Ok("/css/site.css".to_string()));
/// ```
pub fn root_relative_url(path: &Path, root: &Path) -> Result<String, UrlPathError> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| UrlPathError::OutsideRoot)?;
    let mut url = String::with_capacity(rel.as_os_str().len() + 1);
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                url.push('/');
                url.push_str(part.to_str().ok_or(UrlPathError::NonUtf8)?);
            }
            Component::CurDir => {}
            _ => return Err(UrlPathError::OutsideRoot),
        }
    }
    if url.is_empty() {
        url.push('/');
    }
    Ok(url)
}
