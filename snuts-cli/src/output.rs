use std::path::Path;

use colored::Colorize;
use snuts_core::colors::ColorTheme;
use snuts_core::output::{format_clean, truncate_snippet, SEPARATOR};
use snuts_core::smell::Smell;
use snuts_core::watcher::{Reporter, ScanSummary};

/// Format a smell with terminal colors, using the supplied [`ColorTheme`].
pub fn format_pretty(smell: &Smell, theme: &dyn ColorTheme) -> String {
    let mut out = String::new();
    let color = theme.terminal_color(smell.severity);

    out.push_str(&format!("{}\n", SEPARATOR.dimmed()));
    out.push_str(&format!("{} {}\n", "File:".bold(), smell.file.display()));
    out.push_str(&format!(
        "{} {}-{}\n",
        "Location:".bold(),
        smell.start,
        smell.end
    ));
    out.push_str(&format!(
        "{} {} {}\n",
        "Smell:".bold(),
        smell.message.color(color).bold(),
        format!("[{}]", smell.rule).dimmed(),
    ));
    out.push_str(&format!("{}\n", "Code:".bold()));
    for line in truncate_snippet(&smell.code_block).lines() {
        out.push_str(&format!("  {line}\n"));
    }
    out.push_str(&format!("{}\n", SEPARATOR.dimmed()));
    out
}

pub fn format_summary(summary: &ScanSummary) -> String {
    let smells = if summary.smells == 0 {
        "no smells".green().bold()
    } else {
        format!("{} smell(s)", summary.smells).yellow().bold()
    };
    format!(
        "\n{} {} test file(s), {}\n",
        "Scanned".bold(),
        summary.files,
        smells
    )
}

/// Prints colored blocks as files complete.  Each file's output is
/// written with a single `print!` so concurrent files do not interleave.
pub struct ConsoleReporter {
    verbose: bool,
    theme: Box<dyn ColorTheme>,
}

impl ConsoleReporter {
    pub fn new(verbose: bool, theme: Box<dyn ColorTheme>) -> Self {
        Self { verbose, theme }
    }

    fn render(&self, file: &Path, smells: &[Smell]) -> String {
        if smells.is_empty() {
            if self.verbose {
                return format_clean(file).green().to_string();
            }
            return String::new();
        }
        smells
            .iter()
            .map(|s| format_pretty(s, self.theme.as_ref()))
            .collect()
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, file: &Path, smells: &[Smell]) {
        let text = self.render(file, smells);
        if !text.is_empty() {
            print!("{text}");
        }
    }
}
