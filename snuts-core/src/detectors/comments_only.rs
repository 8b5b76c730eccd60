use std::path::Path;

use async_trait::async_trait;
use tree_sitter::Tree;

use super::Detector;
use crate::smell::Smell;
use crate::tree::selector::Selector;
use crate::tree::TreeService;

pub const NAME: &str = "comments-only";

/// Flags test cases whose callback body is an empty block (comments are
/// not statements).
pub struct CommentsOnly {
    service: TreeService,
}

impl CommentsOnly {
    pub fn new(service: TreeService) -> Self {
        Self { service }
    }

    pub fn scan(&self, tree: &Tree, source: &str, file: &Path) -> Vec<Smell> {
        self.service
            .query(tree, source, &Selector::TestCase)
            .into_iter()
            .filter(|&node| self.service.has_empty_body(node))
            .map(|node| {
                Smell::at_node(
                    NAME,
                    node,
                    source,
                    file,
                    "Test case with only comments or empty body detected.",
                )
            })
            .collect()
    }
}

#[async_trait]
impl Detector for CommentsOnly {
    fn name(&self) -> &str {
        NAME
    }

    async fn detect(&self, tree: &Tree, source: &str, file: &Path) -> anyhow::Result<Vec<Smell>> {
        Ok(self.scan(tree, source, file))
    }
}
