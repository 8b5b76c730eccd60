use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// Snippet used when a node's byte range cannot be sliced out of the text.
pub const SNIPPET_FALLBACK: &str = "// Unable to extract code snippet";

/// A point in a source file.  Lines are 1-based, columns are 0-based
/// byte offsets within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl From<tree_sitter::Point> for Position {
    fn from(p: tree_sitter::Point) -> Self {
        Position {
            line: p.row + 1,
            column: p.column,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Info    => write!(f, "info"),
        }
    }
}

/// One finding.  Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Smell {
    pub file: PathBuf,
    pub start: Position,
    pub end: Position,
    pub message: String,
    /// Verbatim source of the offending node, or [`SNIPPET_FALLBACK`].
    pub code_block: String,
    /// Name of the detector that produced this finding.
    pub rule: String,
    pub severity: Severity,
}

impl Smell {
    /// Build a warning spanning `node`.
    pub fn at_node(
        rule: &str,
        node: Node<'_>,
        source: &str,
        file: &Path,
        message: impl Into<String>,
    ) -> Self {
        let code_block = source
            .get(node.byte_range())
            .map(str::to_string)
            .unwrap_or_else(|| SNIPPET_FALLBACK.to_string());
        Smell {
            file: file.to_path_buf(),
            start: node.start_position().into(),
            end: node.end_position().into(),
            message: message.into(),
            code_block,
            rule: rule.to_string(),
            severity: Severity::Warning,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}
