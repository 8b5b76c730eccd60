use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use snuts_core::colors::DefaultTheme;

use super::{build_watcher, load_config, watch_options, GlobalOpts};
use crate::output::ConsoleReporter;

pub async fn run(
    paths: &[PathBuf],
    debounce_ms: Option<u64>,
    concurrency: Option<usize>,
    global: &GlobalOpts,
) -> Result<()> {
    let config = load_config(paths, global.config.as_deref())?;
    let options = watch_options(&config, debounce_ms, concurrency);
    let reporter = Arc::new(ConsoleReporter::new(global.verbose, Box::new(DefaultTheme)));
    let watcher = build_watcher(paths, &config, options, reporter)?;

    let handle = watcher.watch().await.context("starting file watcher")?;
    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    info!("shutting down");
    handle.stop().await;
    Ok(())
}
