use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error};

use crate::config::DetectorSettings;
use crate::detectors::{default_detectors, Detector};
use crate::smell::Smell;
use crate::tree::{SourceUnit, TreeService};

/// Runs a fixed detector set over one file at a time.
///
/// Cloning is cheap; the detector list is shared.
#[derive(Clone)]
pub struct DetectorRunner {
    service: TreeService,
    detectors: Arc<[Arc<dyn Detector>]>,
}

impl DetectorRunner {
    pub fn new(service: TreeService, detectors: Vec<Arc<dyn Detector>>) -> Self {
        Self {
            service,
            detectors: detectors.into(),
        }
    }

    /// Default aliases and the built-in detector set.
    pub fn with_defaults() -> Self {
        let service = TreeService::default();
        let detectors = default_detectors(&service, &DetectorSettings::default());
        Self::new(service, detectors)
    }

    pub fn detector_names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Analyze one file.  Unreadable, empty or unparsable files yield no
    /// smells and no detector is invoked.
    pub async fn run(&self, path: &Path) -> Vec<Smell> {
        match self.service.parse_file(path).await {
            Some(unit) => self.run_unit(&unit, path).await,
            None => vec![],
        }
    }

    /// Run every detector concurrently over the same snapshot.
    ///
    /// Each detector's smells stay in the order it produced them and the
    /// per-detector lists are concatenated in registration order.  A
    /// detector that errors or panics contributes nothing.
    pub async fn run_unit(&self, unit: &SourceUnit, path: &Path) -> Vec<Smell> {
        let handles: Vec<_> = self
            .detectors
            .iter()
            .map(|detector| {
                let name = detector.name().to_string();
                let detector = Arc::clone(detector);
                let unit = unit.clone();
                let file = path.to_path_buf();
                let handle = tokio::spawn(async move {
                    detector.detect(&unit.tree, &unit.text, &file).await
                });
                (name, handle)
            })
            .collect();

        let mut smells = Vec::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(Ok(found)) => {
                    debug!(detector = %name, file = %path.display(), count = found.len(), "detector finished");
                    smells.extend(found);
                }
                Ok(Err(err)) => {
                    error!(detector = %name, file = %path.display(), error = %err, "detector failed");
                }
                Err(err) => {
                    error!(detector = %name, file = %path.display(), error = %err, "detector panicked");
                }
            }
        }
        smells
    }
}
