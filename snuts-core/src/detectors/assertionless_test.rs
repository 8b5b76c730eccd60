use std::path::Path;

use async_trait::async_trait;
use tree_sitter::Tree;

use super::Detector;
use crate::smell::Smell;
use crate::tree::selector::Selector;
use crate::tree::TreeService;

pub const NAME: &str = "assertionless-test";

/// Flags test cases that never call `expect`.  Empty bodies belong to
/// [`super::CommentsOnly`] and are skipped here.
pub struct AssertionlessTest {
    service: TreeService,
}

impl AssertionlessTest {
    pub fn new(service: TreeService) -> Self {
        Self { service }
    }

    pub fn scan(&self, tree: &Tree, source: &str, file: &Path) -> Vec<Smell> {
        let mut smells = Vec::new();
        for node in self.service.query(tree, source, &Selector::TestCase) {
            if self.service.has_empty_body(node) {
                continue;
            }
            let Some(info) = self.service.test_info(node, source) else {
                continue;
            };
            if !info.has_assert {
                smells.push(Smell::at_node(
                    NAME,
                    node,
                    source,
                    file,
                    format!("Test case without assertions detected: \"{}\".", info.name.trim()),
                ));
            }
        }
        smells
    }
}

#[async_trait]
impl Detector for AssertionlessTest {
    fn name(&self) -> &str {
        NAME
    }

    async fn detect(&self, tree: &Tree, source: &str, file: &Path) -> anyhow::Result<Vec<Smell>> {
        Ok(self.scan(tree, source, file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> Vec<Smell> {
        let service = TreeService::default();
        let unit = service.parse(src).unwrap();
        AssertionlessTest::new(service).scan(&unit.tree, &unit.text, Path::new("a.test.js"))
    }

    #[test]
    fn test_without_expect_is_flagged() {
        let smells = run("it('renders the page', () => { render(page); });");
        assert_eq!(smells.len(), 1);
        assert_eq!(
            smells[0].message,
            "Test case without assertions detected: \"renders the page\"."
        );
    }

    #[test]
    fn any_expect_rooted_call_counts() {
        assert!(run("it('chained matcher call', () => { expect(a).not.toBe(b); });").is_empty());
        assert!(run("it('assertion count check', async () => { expect.assertions(1); await go(); });").is_empty());
    }

    #[test]
    fn empty_bodies_are_left_to_comments_only() {
        assert!(run("it('nothing in here', () => {});").is_empty());
    }
}
