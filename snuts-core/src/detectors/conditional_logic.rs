//! `if` / `switch` statements in tests.
//!
//! Inside a test case each statement is a warning.  Inside a suite but
//! outside every test case (suite bodies, hooks, helpers declared in a
//! `describe`) it is reported at `info`.  Top-level code outside any suite
//! is not test code and is left alone.

use std::path::Path;

use async_trait::async_trait;
use tree_sitter::{Node, Tree};

use super::Detector;
use crate::smell::{Severity, Smell};
use crate::tree::selector::Selector;
use crate::tree::TreeService;

pub const NAME: &str = "conditional-logic";

pub struct ConditionalLogic {
    service: TreeService,
}

impl ConditionalLogic {
    pub fn new(service: TreeService) -> Self {
        Self { service }
    }

    pub fn scan(&self, tree: &Tree, source: &str, file: &Path) -> Vec<Smell> {
        let statements = Selector::kind(&["if_statement", "switch_statement"]);
        let in_test = Selector::Inside(Box::new(Selector::TestCase));
        let in_suite = Selector::Inside(Box::new(Selector::Suite));

        let mut smells = Vec::new();
        for node in self.service.query(tree, source, &statements) {
            let kind = statement_label(node);
            if self.service.matches(node, source, &in_test) {
                smells.push(Smell::at_node(
                    NAME,
                    node,
                    source,
                    file,
                    format!("Conditional test logic detected ({kind})."),
                ));
            } else if self.service.matches(node, source, &in_suite) {
                smells.push(
                    Smell::at_node(
                        NAME,
                        node,
                        source,
                        file,
                        format!("Conditional logic outside of test case detected ({kind})."),
                    )
                    .with_severity(Severity::Info),
                );
            }
        }
        smells
    }
}

fn statement_label(node: Node<'_>) -> &'static str {
    match node.kind() {
        "switch_statement" => "switch statement",
        _                  => "if statement",
    }
}

#[async_trait]
impl Detector for ConditionalLogic {
    fn name(&self) -> &str {
        NAME
    }

    async fn detect(&self, tree: &Tree, source: &str, file: &Path) -> anyhow::Result<Vec<Smell>> {
        Ok(self.scan(tree, source, file))
    }
}
