//! Standalone compilation of script and stylesheet entry points.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Each file is compiled
//! on its own: imports are left as written, nothing is inlined.

use std::path::Path;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// Kind of compilable entry point, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Script,
    Stylesheet,
}

impl EntryKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("js") {
            Some(Self::Script)
        } else if ext.eq_ignore_ascii_case("css") {
            Some(Self::Stylesheet)
        } else {
            None
        }
    }
}

/// Whether the file is already minified (`*.min.js`, `*.min.css`).
pub fn is_preminified(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.to_ascii_lowercase().ends_with(".min"))
}

/// Compile JavaScript source code.
///
/// Returns the first parser diagnostic on failure.
pub fn compile_js(source: &str, minify: bool) -> Result<String, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(err.to_string());
    }
    if ret.panicked {
        return Err("parser aborted".to_string());
    }

    let mut program = ret.program;
    if !minify {
        return Ok(Codegen::new().build(&program).code);
    }

    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Compile CSS source code.
///
/// `filename` only appears in error locations.
pub fn compile_css(source: &str, filename: &str, minify: bool) -> Result<String, String> {
    let options = ParserOptions {
        filename: filename.to_string(),
        ..ParserOptions::default()
    };
    let mut stylesheet = StyleSheet::parse(source, options).map_err(|e| e.to_string())?;
    if minify {
        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| e.to_string())?;
    }
    let result = stylesheet
        .to_css(PrinterOptions {
            minify,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;
    Ok(result.code)
}

/// Compile an entry point based on its extension.
///
/// Pre-minified files are re-emitted without another minification pass.
pub fn compile_entry(path: &Path, source: &str, minify: bool) -> Result<String, String> {
    let minify = minify && !is_preminified(path);
    match EntryKind::from_path(path) {
        Some(EntryKind::Script) => compile_js(source, minify),
        Some(EntryKind::Stylesheet) => compile_css(source, &path.display().to_string(), minify),
        None => Err(format!("unsupported entry point `{}`", path.display())),
    }
}
