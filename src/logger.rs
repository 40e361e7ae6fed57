//! Terminal output: prefixed log lines and an in-place progress line.
//!
//! ```text
//! [build] bundle(3/5) html(2/9)       <- ProgressLine, redrawn in place
//! [build] 5 entry points, ...         <- log!
//! [rewrite] /index.html (2 references) <- debug!, only with --verbose
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{StdoutLock, Write, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set by `ProgressLine` while it owns the last terminal line.
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Enable or disable `debug!` output (`--verbose`).
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Print `[module] message`.
///
/// ```ignore
/// log!("build"; "{} entry points", count);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, but only printed with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

pub fn log(module: &str, message: &str) {
    let mut out = stdout().lock();
    if PROGRESS_ACTIVE.load(Ordering::SeqCst) {
        clear_line(&mut out);
    }
    writeln!(out, "{} {message}", colorize_prefix(module)).ok();
    out.flush().ok();
}

fn clear_line(out: &mut StdoutLock<'_>) {
    execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
}

fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "build" => prefix.bright_green().bold().to_string(),
        "clean" => prefix.bright_blue().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// ProgressLine
// ============================================================================

/// Per-stage counters rendered on one line: `[build] bundle(3/5) html(2/9)`.
///
/// Stages with a zero total stay hidden until `set_total` gives them one.
/// Dropping without `finish` (a failed build) erases the line.
pub struct ProgressLine {
    stages: Mutex<Vec<Stage>>,
    finished: AtomicBool,
}

struct Stage {
    name: &'static str,
    done: usize,
    total: usize,
}

impl ProgressLine {
    pub fn new(stages: &[(&'static str, usize)]) -> Self {
        let stages = stages
            .iter()
            .map(|&(name, total)| Stage {
                name,
                done: 0,
                total,
            })
            .collect();

        PROGRESS_ACTIVE.store(true, Ordering::SeqCst);
        let progress = Self {
            stages: Mutex::new(stages),
            finished: AtomicBool::new(false),
        };
        progress.redraw(false);
        progress
    }

    pub fn set_total(&self, name: &str, total: usize) {
        if self.update(name, |stage| stage.total = total) {
            self.redraw(false);
        }
    }

    pub fn inc(&self, name: &str) {
        if self.update(name, |stage| stage.done += 1) {
            self.redraw(false);
        }
    }

    fn update(&self, name: &str, f: impl FnOnce(&mut Stage)) -> bool {
        let mut stages = self.stages.lock();
        match stages.iter_mut().find(|s| s.name == name) {
            Some(stage) => {
                f(stage);
                true
            }
            None => false,
        }
    }

    fn line(&self) -> String {
        self.stages
            .lock()
            .iter()
            .filter(|s| s.total > 0)
            .map(|s| format!("{}({}/{})", s.name, s.done, s.total))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn redraw(&self, newline: bool) {
        let line = self.line();
        let mut out = stdout().lock();
        clear_line(&mut out);
        write!(out, "{} {line}", colorize_prefix("build")).ok();
        if newline {
            writeln!(out).ok();
        }
        out.flush().ok();
    }

    /// Leave the final counts on screen and release the terminal line.
    pub fn finish(self) {
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);
        self.redraw(true);
        self.finished.store(true, Ordering::SeqCst);
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);
        if self.finished.load(Ordering::SeqCst) {
            return;
        }
        let mut out = stdout().lock();
        clear_line(&mut out);
        out.flush().ok();
    }
}
