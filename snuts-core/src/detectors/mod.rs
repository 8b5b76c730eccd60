pub mod assertionless_test;
pub mod comments_only;
pub mod conditional_logic;
pub mod identical_description;
pub mod overcommented;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tree_sitter::Tree;

use crate::config::DetectorSettings;
use crate::smell::Smell;
use crate::tree::TreeService;

pub use anonymous_test::AnonymousTest;
pub use assertionless_test::AssertionlessTest;
pub use comments_only::CommentsOnly;
pub use conditional_logic::ConditionalLogic;
pub use identical_description::IdenticalDescription;
pub use overcommented::Overcommented;

/// A single smell rule.
///
/// Implementations receive one file's tree and exact source text and must
/// not keep state between calls; the runner executes detectors of one file
/// concurrently and many files in parallel.  An `Err` (or a panic) drops
/// only this detector's contribution for that file.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Stable rule name, e.g. `"conditional-logic"`.
    fn name(&self) -> &str;

    async fn detect(&self, tree: &Tree, source: &str, file: &Path) -> anyhow::Result<Vec<Smell>>;
}

/// The built-in detector set in registration order, minus any disabled
/// in `settings`.
pub fn default_detectors(service: &TreeService, settings: &DetectorSettings) -> Vec<Arc<dyn Detector>> {
    let all: Vec<Arc<dyn Detector>> = vec![
        Arc::new(ConditionalLogic::new(service.clone())),
        Arc::new(IdenticalDescription::new(service.clone())),
        Arc::new(AnonymousTest::new(service.clone(), settings.max_anonymous_words)),
        Arc::new(CommentsOnly::new(service.clone())),
        Arc::new(Overcommented::new(service.clone(), settings.max_comments_per_test)),
        Arc::new(AssertionlessTest::new(service.clone())),
    ];
    all.into_iter()
        .filter(|d| settings.is_enabled(d.name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_is_ordered_and_uniquely_named() {
        let detectors = default_detectors(&TreeService::default(), &DetectorSettings::default());
        let names: Vec<_> = detectors.iter().map(|d| d.name().to_string()).collect();
        assert_eq!(
            names,
            vec![
                conditional_logic::NAME,
                identical_description::NAME,
                anonymous_test::NAME,
                comments_only::NAME,
                overcommented::NAME,
                assertionless_test::NAME,
            ]
        );
    }

    #[test]
    fn disabled_detectors_are_left_out() {
        let settings = DetectorSettings {
            disabled: vec![overcommented::NAME.into(), "no-such-rule".into()],
            ..DetectorSettings::default()
        };
        let detectors = default_detectors(&TreeService::default(), &settings);
        assert_eq!(detectors.len(), 5);
        assert!(detectors.iter().all(|d| d.name() != overcommented::NAME));
    }
}
