//! Post-bundle document processing.
//!
//! Runs after the manifest is complete: every HTML document in the output
//! tree has its `link[href]` / `script[src]` references pointed at hashed
//! assets.
//!
//! ```text
//! output tree + manifest -> rewrite_tree -> rewritten documents
//! ```

pub mod rewrite;

pub use rewrite::{RewriteStats, html_documents, rewrite_html, rewrite_tree};
