pub mod scan;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use snuts_core::config::SnutsConfig;
use snuts_core::detectors::default_detectors;
use snuts_core::discovery::Discovery;
use snuts_core::runner::DetectorRunner;
use snuts_core::tree::TreeService;
use snuts_core::watcher::{Reporter, WatchOptions, Watcher};

/// Flags shared by every subcommand.
pub struct GlobalOpts {
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

/// Explicit `--config`, or the nearest `.snuts` above the first path.
pub fn load_config(paths: &[PathBuf], explicit: Option<&Path>) -> Result<SnutsConfig> {
    if let Some(path) = explicit {
        return SnutsConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()));
    }
    let start = paths.first().cloned().unwrap_or_else(|| PathBuf::from("."));
    SnutsConfig::load(&start).context("loading .snuts")
}

/// Session options from the config file, with CLI flags taking precedence.
pub fn watch_options(config: &SnutsConfig, debounce_ms: Option<u64>, concurrency: Option<usize>) -> WatchOptions {
    let mut settings = config.watch.clone();
    if let Some(ms) = debounce_ms {
        settings.debounce_ms = ms;
    }
    if let Some(n) = concurrency {
        settings.concurrency = n;
    }
    settings.into()
}

/// Wire discovery, the configured detector set and a reporter into a
/// [`Watcher`].
pub fn build_watcher(
    paths: &[PathBuf],
    config: &SnutsConfig,
    options: WatchOptions,
    reporter: Arc<dyn Reporter>,
) -> Result<Watcher> {
    let discovery = Discovery::from_config(paths, config).context("building test file matcher")?;
    if discovery.roots().is_empty() {
        anyhow::bail!("none of the given paths exist");
    }
    let service = TreeService::new(config.aliases.clone());
    let detectors = default_detectors(&service, &config.detectors);
    let runner = DetectorRunner::new(service, detectors);
    Ok(Watcher::new(options, discovery, runner, reporter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snuts_core::output::CollectingReporter;
    use std::time::Duration;

    #[test]
    fn flags_override_config_values() {
        let config = SnutsConfig::default();
        let opts = watch_options(&config, Some(50), None);
        assert_eq!(opts.debounce, Duration::from_millis(50));
        assert_eq!(opts.concurrency_limit, 10);
        let opts = watch_options(&config, None, Some(3));
        assert_eq!(opts.debounce, Duration::from_millis(200));
        assert_eq!(opts.concurrency_limit, 3);
    }

    #[test]
    fn config_is_discovered_from_the_first_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".snuts"), "[watch]\nconcurrency = 4\n").unwrap();
        std::fs::create_dir(dir.path().join("tests")).unwrap();
        let config = load_config(&[dir.path().join("tests")], None).unwrap();
        assert_eq!(config.watch.concurrency, 4);
    }

    #[test]
    fn explicit_config_errors_surface() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(&[], Some(&missing)).is_err());
    }

    #[test]
    fn missing_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_watcher(
            &[dir.path().join("absent")],
            &SnutsConfig::default(),
            WatchOptions::default(),
            Arc::new(CollectingReporter::default()),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("none of the given paths exist"));
    }
}
