use std::path::Path;

use async_trait::async_trait;
use tree_sitter::Tree;

use super::Detector;
use crate::smell::Smell;
use crate::tree::selector::Selector;
use crate::tree::TreeService;

pub const NAME: &str = "overcommented";

/// Flags test statements carrying more than `max_comments` comments,
/// counting the comments directly above the statement.
pub struct Overcommented {
    service: TreeService,
    max_comments: usize,
}

impl Overcommented {
    pub fn new(service: TreeService, max_comments: usize) -> Self {
        Self {
            service,
            max_comments,
        }
    }

    pub fn scan(&self, tree: &Tree, source: &str, file: &Path) -> Vec<Smell> {
        let mut smells = Vec::new();
        for stmt in self
            .service
            .query(tree, source, &Selector::kind(&["expression_statement"]))
        {
            let Some(call) = self.service.statement_call(stmt) else {
                continue;
            };
            if !self.service.is_test_case(call, source) {
                continue;
            }
            let count = self.service.count_comments(stmt);
            if count > self.max_comments {
                smells.push(Smell::at_node(
                    NAME,
                    stmt,
                    source,
                    file,
                    format!(
                        "Test has too many comments ({count}). The maximum allowed is {}.",
                        self.max_comments
                    ),
                ));
            }
        }
        smells
    }
}

#[async_trait]
impl Detector for Overcommented {
    fn name(&self) -> &str {
        NAME
    }

    async fn detect(&self, tree: &Tree, source: &str, file: &Path) -> anyhow::Result<Vec<Smell>> {
        Ok(self.scan(tree, source, file))
    }
}
