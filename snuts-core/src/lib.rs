#![deny(dead_code)]

pub mod colors;
pub mod config;
pub mod detectors;
pub mod dialect;
pub mod discovery;
pub mod error;
pub mod ignore_rules;
pub mod output;
pub mod runner;
pub mod smell;
pub mod tree;
pub mod watcher;

use std::path::Path;

use runner::DetectorRunner;
use smell::Smell;
use tree::SourceUnit;

/// Run the built-in detectors over an already parsed unit.
pub async fn detect(unit: &SourceUnit, path: &Path) -> Vec<Smell> {
    DetectorRunner::with_defaults().run_unit(unit, path).await
}

/// Parse and analyze a source string with the built-in detectors.
///
/// `path` is used for the dialect hint and for the `file` of each smell;
/// it is never read.
pub async fn analyze_source(source: &str, path: &Path) -> Result<Vec<Smell>, error::TreeError> {
    let runner = DetectorRunner::with_defaults();
    let unit = tree::TreeService::default().parse_with_hint(source, Some(path))?;
    Ok(runner.run_unit(&unit, path).await)
}

/// Read, parse and analyze one file with the built-in detectors.
pub async fn analyze_file(path: &Path) -> Result<Vec<Smell>, error::TreeError> {
    let unit = tree::TreeService::default().load(path).await?;
    Ok(detect(&unit, path).await)
}
