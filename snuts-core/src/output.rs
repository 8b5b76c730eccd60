use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::smell::Smell;
use crate::watcher::Reporter;

/// Output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Text,
    Json,
}

pub const SNIPPET_MAX_LINES: usize = 10;
pub const SNIPPET_MAX_CHARS: usize = 600;
pub const SEPARATOR: &str = "----------------------------------------";

/// Cut a code snippet down to [`SNIPPET_MAX_LINES`] lines and
/// [`SNIPPET_MAX_CHARS`] characters, appending `…` when anything was
/// dropped.
pub fn truncate_snippet(code: &str) -> String {
    let mut kept: String = code
        .lines()
        .take(SNIPPET_MAX_LINES)
        .collect::<Vec<_>>()
        .join("\n");
    let mut truncated = code.lines().count() > SNIPPET_MAX_LINES;

    if let Some((idx, _)) = kept.char_indices().nth(SNIPPET_MAX_CHARS) {
        kept.truncate(idx);
        truncated = true;
    }
    if truncated {
        kept.push_str("\n…");
    }
    kept
}

/// Format a single smell as a plain-text block (no colors).
pub fn format_text(smell: &Smell) -> String {
    let mut out = String::new();
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(&format!("File: {}\n", smell.file.display()));
    out.push_str(&format!("Location: {}-{}\n", smell.start, smell.end));
    out.push_str(&format!(
        "Smell: {} [{}, {}]\n",
        smell.message, smell.rule, smell.severity
    ));
    out.push_str(&format!("Code:\n{}\n", truncate_snippet(&smell.code_block)));
    out.push_str(SEPARATOR);
    out.push('\n');
    out
}

/// One-line status for a file without findings.
pub fn format_clean(file: &Path) -> String {
    format!("✓ {}: no smells\n", file.display())
}

/// Format findings as a JSON array.
pub fn format_json(smells: &[Smell]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(smells)
}

// ---------------------------------------------------------------------------
// Reporters
// ---------------------------------------------------------------------------

/// Prints plain-text blocks to stdout as files complete.
pub struct TextReporter {
    pub verbose: bool,
}

impl Reporter for TextReporter {
    fn report(&self, file: &Path, smells: &[Smell]) {
        if smells.is_empty() {
            if self.verbose {
                print!("{}", format_clean(file));
            }
            return;
        }
        for smell in smells {
            print!("{}", format_text(smell));
        }
    }
}

/// Keeps every report in memory, in arrival order.
#[derive(Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<(PathBuf, Vec<Smell>)>>,
}

impl CollectingReporter {
    /// Number of files reported so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Every smell reported so far, sorted by file then position.
    pub fn smells(&self) -> Vec<Smell> {
        let mut all: Vec<Smell> = self
            .lock()
            .iter()
            .flat_map(|(_, smells)| smells.iter().cloned())
            .collect();
        all.sort_by(|a, b| (&a.file, a.start).cmp(&(&b.file, b.start)));
        all
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(PathBuf, Vec<Smell>)>> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, file: &Path, smells: &[Smell]) {
        self.lock().push((file.to_path_buf(), smells.to_vec()));
    }
}
