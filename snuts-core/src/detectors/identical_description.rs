use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use tree_sitter::Tree;

use super::Detector;
use crate::smell::Smell;
use crate::tree::selector::Selector;
use crate::tree::TreeService;

pub const NAME: &str = "identical-description";

/// Flags every repeat of a test description within one file.  The first
/// occurrence is never flagged.
pub struct IdenticalDescription {
    service: TreeService,
}

impl IdenticalDescription {
    pub fn new(service: TreeService) -> Self {
        Self { service }
    }

    pub fn scan(&self, tree: &Tree, source: &str, file: &Path) -> Vec<Smell> {
        let mut seen = HashSet::new();
        let mut smells = Vec::new();
        for node in self.service.query(tree, source, &Selector::TestCase) {
            let Some(description) = self.service.description(node, source) else {
                continue;
            };
            let key = description.trim().to_string();
            if !seen.insert(key.clone()) {
                smells.push(Smell::at_node(
                    NAME,
                    node,
                    source,
                    file,
                    format!("Identical description test case detected: \"{key}\"."),
                ));
            }
        }
        smells
    }
}

#[async_trait]
impl Detector for IdenticalDescription {
    fn name(&self) -> &str {
        NAME
    }

    async fn detect(&self, tree: &Tree, source: &str, file: &Path) -> anyhow::Result<Vec<Smell>> {
        Ok(self.scan(tree, source, file))
    }
}
