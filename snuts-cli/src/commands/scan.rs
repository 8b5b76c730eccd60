use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use snuts_core::colors::DefaultTheme;
use snuts_core::output::{self as core_output, CollectingReporter, OutputFormat, TextReporter};
use snuts_core::watcher::Reporter;

use super::{build_watcher, load_config, watch_options, GlobalOpts};
use crate::output::{self, ConsoleReporter};

pub fn parse_format(s: &str) -> Result<OutputFormat> {
    match s {
        "pretty" => Ok(OutputFormat::Pretty),
        "text"   => Ok(OutputFormat::Text),
        "json"   => Ok(OutputFormat::Json),
        other    => anyhow::bail!("unknown format: {other} (expected pretty, text, or json)"),
    }
}

/// One-shot scan.  Returns the number of smells found.
pub async fn run(
    paths: &[PathBuf],
    format: &str,
    concurrency: Option<usize>,
    global: &GlobalOpts,
) -> Result<usize> {
    let fmt = parse_format(format)?;
    let config = load_config(paths, global.config.as_deref())?;
    let options = watch_options(&config, None, concurrency);

    let collector = Arc::new(CollectingReporter::default());
    let reporter: Arc<dyn Reporter> = match fmt {
        OutputFormat::Json   => collector.clone(),
        OutputFormat::Text   => Arc::new(TextReporter { verbose: global.verbose }),
        OutputFormat::Pretty => Arc::new(ConsoleReporter::new(global.verbose, Box::new(DefaultTheme))),
    };

    let watcher = build_watcher(paths, &config, options, reporter)?;
    let summary = watcher.initial_scan().await;

    match fmt {
        OutputFormat::Json => {
            let json = core_output::format_json(&collector.smells()).context("serializing smells")?;
            println!("{json}");
        }
        OutputFormat::Pretty => print!("{}", output::format_summary(&summary)),
        OutputFormat::Text => {}
    }
    Ok(summary.smells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global() -> GlobalOpts {
        GlobalOpts {
            verbose: false,
            config: None,
        }
    }

    #[test]
    fn parse_format_accepts_known_names() {
        assert_eq!(parse_format("pretty").unwrap(), OutputFormat::Pretty);
        assert_eq!(parse_format("text").unwrap(), OutputFormat::Text);
        assert_eq!(parse_format("json").unwrap(), OutputFormat::Json);
        assert!(parse_format("xml").is_err());
    }

    #[tokio::test]
    async fn scan_counts_smells_across_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.test.js"),
            "it('works', () => { expect(1).toBe(1); });\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b.spec.ts"),
            "it('adds typed numbers', () => { const n: number = 1; expect(n).toBe(1); });\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("helper.js"), "it('x', () => {});\n").unwrap();

        let found = run(&[dir.path().to_path_buf()], "json", Some(2), &global()).await.unwrap();
        assert_eq!(found, 1);
    }

    #[tokio::test]
    async fn disabled_rules_in_config_are_respected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".snuts"), "[detectors]\ndisabled = [\"anonymous-test\"]\n").unwrap();
        std::fs::write(
            dir.path().join("a.test.js"),
            "it('works', () => { expect(1).toBe(1); });\n",
        )
        .unwrap();
        let found = run(&[dir.path().to_path_buf()], "text", None, &global()).await.unwrap();
        assert_eq!(found, 0);
    }

    #[tokio::test]
    async fn unknown_format_fails_before_scanning() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&[dir.path().to_path_buf()], "yaml", None, &global()).await.is_err());
    }
}
