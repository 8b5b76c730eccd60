//! Syntax-tree acquisition and test-structure classification.
//!
//! [`TreeService`] owns the configured alias sets and exposes everything a
//! detector needs: parsing with dialect fallback, selector queries, and
//! the test / suite / hook predicates.  The predicates lower tree-sitter
//! nodes into [`shape::CallShape`] and delegate the decision to the pure
//! functions in [`shape`].

pub mod selector;
pub mod shape;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, warn};
use tree_sitter::{Node, Parser, Tree};

use crate::dialect::Dialect;
use crate::error::TreeError;
use selector::Selector;
use shape::{Aliases, ArgShape, CallShape, Callee, FunctionKind};

/// A parsed file: the tree plus the exact text it was parsed from.
///
/// Cloning is cheap (the tree is reference counted, the text is shared),
/// which lets every detector task hold its own handle to one snapshot.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub tree: Tree,
    pub text: Arc<str>,
}

/// Summary of a single test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInfo {
    pub name: String,
    /// A call rooted at `expect` exists somewhere in the test.
    pub has_assert: bool,
    /// Test cases nested below this one (the node itself excluded).
    pub it_count: usize,
    /// Suites nested below this one.
    pub describe_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TreeService {
    aliases: Aliases,
}

impl TreeService {
    pub fn new(aliases: Aliases) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &Aliases {
        &self.aliases
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    /// Parse source text, trying JavaScript first and TypeScript second.
    pub fn parse(&self, text: &str) -> Result<SourceUnit, TreeError> {
        self.parse_with_hint(text, None)
    }

    /// Parse source text, letting the file extension choose which dialect
    /// is attempted first.  The other dialect is always tried on failure.
    pub fn parse_with_hint(&self, text: &str, path: Option<&Path>) -> Result<SourceUnit, TreeError> {
        if text.trim().is_empty() {
            return Err(TreeError::EmptyInput);
        }

        let order = Dialect::attempt_order(path);
        let mut error_at = (1, 0);
        for dialect in order {
            let mut parser = Parser::new();
            if let Err(e) = parser.set_language(&dialect.ts_language()) {
                debug!(%dialect, error = %e, "grammar unavailable");
                continue;
            }
            let Some(tree) = parser.parse(text, None) else {
                continue;
            };
            if !tree.root_node().has_error() {
                debug!(%dialect, "parsed");
                return Ok(SourceUnit {
                    tree,
                    text: Arc::from(text),
                });
            }
            error_at = first_error_position(tree.root_node());
        }

        Err(TreeError::Parse {
            dialects: order.map(|d| d.to_string()).join(", "),
            line: error_at.0,
            column: error_at.1,
        })
    }

    /// Read and parse a file, surfacing the reason on failure.
    pub async fn load(&self, path: &Path) -> Result<SourceUnit, TreeError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TreeError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;
        self.parse_with_hint(&text, Some(path))
    }

    /// Read and parse a file; failures are logged and become `None`.
    pub async fn parse_file(&self, path: &Path) -> Option<SourceUnit> {
        match self.load(path).await {
            Ok(unit) => Some(unit),
            Err(err) if err.is_warning() => {
                warn!(file = %path.display(), error = %err, "skipping file");
                None
            }
            Err(err) => {
                error!(file = %path.display(), error = %err, "skipping file");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Every node in `tree` matching `selector`, in document order.
    pub fn query<'t>(&self, tree: &'t Tree, source: &str, selector: &Selector) -> Vec<Node<'t>> {
        preorder(tree.root_node())
            .into_iter()
            .filter(|&n| self.matches(n, source, selector))
            .collect()
    }

    pub fn matches(&self, node: Node<'_>, source: &str, selector: &Selector) -> bool {
        match selector {
            Selector::Kind(kinds) => kinds.contains(&node.kind()),
            Selector::Call(names) => self
                .call_shape(node, source)
                .and_then(|s| s.callee)
                .is_some_and(|c| shape::callee_matches(&c, names)),
            Selector::TestCase => self.is_test_case(node, source),
            Selector::Suite => self.is_describe_block(node, source),
            Selector::Hook => self.is_hook(node, source),
            Selector::Function => self.is_function(node),
            Selector::Inside(outer) => {
                let mut current = node.parent();
                while let Some(ancestor) = current {
                    if self.matches(ancestor, source, outer) {
                        return true;
                    }
                    current = ancestor.parent();
                }
                false
            }
            Selector::Has(inner) => preorder(node)
                .into_iter()
                .skip(1)
                .any(|d| self.matches(d, source, inner)),
            Selector::All(parts) => parts.iter().all(|p| self.matches(node, source, p)),
            Selector::Not(inner) => !self.matches(node, source, inner),
        }
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    pub fn is_function(&self, node: Node<'_>) -> bool {
        function_kind(node).is_some()
    }

    pub fn is_test_case(&self, node: Node<'_>, source: &str) -> bool {
        self.call_shape(node, source)
            .is_some_and(|s| shape::is_described_block(&s, &self.aliases.tests))
    }

    pub fn is_describe_block(&self, node: Node<'_>, source: &str) -> bool {
        self.call_shape(node, source)
            .is_some_and(|s| shape::is_described_block(&s, &self.aliases.suites))
    }

    pub fn is_hook(&self, node: Node<'_>, source: &str) -> bool {
        self.call_shape(node, source)
            .is_some_and(|s| shape::is_hook_block(&s, &self.aliases.hooks))
    }

    /// Lower a call expression into its normalized shape.
    pub fn call_shape(&self, node: Node<'_>, source: &str) -> Option<CallShape> {
        if node.kind() != "call_expression" {
            return None;
        }
        let callee = node
            .child_by_field_name("function")
            .and_then(|f| resolve_callee(f, source));
        let args = node
            .child_by_field_name("arguments")
            .filter(|a| a.kind() == "arguments")
            .map(|a| {
                a.named_children(&mut a.walk())
                    .filter(|c| c.kind() != "comment")
                    .map(|c| arg_shape(c, source))
                    .collect()
            })
            .unwrap_or_default();
        Some(CallShape { callee, args })
    }

    /// The literal description of a test case or suite.
    pub fn description(&self, node: Node<'_>, source: &str) -> Option<String> {
        self.call_shape(node, source)?
            .description()
            .map(str::to_string)
    }

    /// The block body of the callback passed to a test or suite, if the
    /// callback has one (expression-bodied arrows do not).
    pub fn callback_body<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        let args = node.child_by_field_name("arguments")?;
        let callback = args
            .named_children(&mut args.walk())
            .filter(|c| c.kind() != "comment")
            .nth(1)?;
        function_kind(callback)?;
        callback
            .child_by_field_name("body")
            .filter(|b| b.kind() == "statement_block")
    }

    /// `true` when the callback body is a block with no statements.
    /// Comments do not count as statements.
    pub fn has_empty_body(&self, node: Node<'_>) -> bool {
        self.callback_body(node).is_some_and(|body| {
            body.named_children(&mut body.walk())
                .all(|c| c.kind() == "comment")
        })
    }

    /// The call an expression statement wraps, looking through `await`
    /// and parentheses.
    pub fn statement_call<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() != "expression_statement" {
            return None;
        }
        let mut expr = node.named_child(0)?;
        loop {
            match expr.kind() {
                "call_expression" => return Some(expr),
                "await_expression" | "parenthesized_expression" => {
                    expr = expr
                        .named_children(&mut expr.walk())
                        .find(|c| c.kind() != "comment")?;
                }
                _ => return None,
            }
        }
    }

    // -----------------------------------------------------------------------
    // Comments
    // -----------------------------------------------------------------------

    /// Leading, inner and trailing comments attached to `node`.
    ///
    /// Leading comments are the unbroken run of comment siblings directly
    /// before the node; trailing comments are comment siblings that start on
    /// the line the node ends on.
    pub fn count_comments(&self, node: Node<'_>) -> usize {
        let inner = preorder(node)
            .into_iter()
            .skip(1)
            .filter(|n| n.kind() == "comment")
            .count();

        let mut leading = 0;
        let mut prev = node.prev_sibling();
        while let Some(sibling) = prev.filter(|s| s.kind() == "comment") {
            leading += 1;
            prev = sibling.prev_sibling();
        }

        let end_row = node.end_position().row;
        let mut trailing = 0;
        let mut next = node.next_sibling();
        while let Some(sibling) = next
            .filter(|s| s.kind() == "comment" && s.start_position().row == end_row)
        {
            trailing += 1;
            next = sibling.next_sibling();
        }

        leading + inner + trailing
    }

    pub fn has_many_comments(&self, node: Node<'_>, max: usize) -> bool {
        self.count_comments(node) > max
    }

    // -----------------------------------------------------------------------
    // Test info
    // -----------------------------------------------------------------------

    /// Summarize a test case; `None` for anything that is not one.
    pub fn test_info(&self, node: Node<'_>, source: &str) -> Option<TestInfo> {
        let shape = self.call_shape(node, source)?;
        if !shape::is_described_block(&shape, &self.aliases.tests) {
            return None;
        }

        let mut it_count = 0;
        let mut describe_count = 0;
        for d in preorder(node).into_iter().skip(1) {
            if self.is_test_case(d, source) {
                it_count += 1;
            } else if self.is_describe_block(d, source) {
                describe_count += 1;
            }
        }

        Some(TestInfo {
            name: shape.description().unwrap_or_default().to_string(),
            has_assert: has_expect_call(node, source),
            it_count,
            describe_count,
        })
    }
}

// ---------------------------------------------------------------------------
// Node helpers
// ---------------------------------------------------------------------------

/// `root` and all of its descendants in document order.
fn preorder(root: Node<'_>) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    let mut cursor = root.walk();
    'walk: loop {
        nodes.push(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                continue 'walk;
            }
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
    nodes
}

fn first_error_position(root: Node<'_>) -> (usize, usize) {
    preorder(root)
        .into_iter()
        .find(|n| n.is_error() || n.is_missing())
        .map(|n| {
            let p = n.start_position();
            (p.row + 1, p.column)
        })
        .unwrap_or((1, 0))
}

fn function_kind(node: Node<'_>) -> Option<FunctionKind> {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => Some(FunctionKind::Declaration),
        "function" | "function_expression" | "generator_function" => Some(FunctionKind::Expression),
        "arrow_function" => Some(FunctionKind::Arrow),
        "method_definition" => {
            let in_class = node.parent().is_some_and(|p| p.kind() == "class_body");
            let private = node
                .child_by_field_name("name")
                .is_some_and(|n| n.kind() == "private_property_identifier");
            Some(match (in_class, private) {
                (true, true)  => FunctionKind::PrivateClassMethod,
                (true, false) => FunctionKind::ClassMethod,
                _             => FunctionKind::ObjectMethod,
            })
        }
        _ => None,
    }
}

fn resolve_callee(node: Node<'_>, source: &str) -> Option<Callee> {
    match node.kind() {
        "identifier" => Some(Callee {
            name: text_of(node, source)?.to_string(),
            modifier: None,
        }),
        "member_expression" => {
            let object = node.child_by_field_name("object")?;
            let property = node.child_by_field_name("property")?;
            if object.kind() != "identifier" {
                return None;
            }
            Some(Callee {
                name: text_of(object, source)?.to_string(),
                modifier: Some(text_of(property, source)?.to_string()),
            })
        }
        _ => None,
    }
}

fn arg_shape(node: Node<'_>, source: &str) -> ArgShape {
    if let Some(kind) = function_kind(node) {
        return ArgShape::Function(kind);
    }
    match node.kind() {
        "string" => literal_value(node, source).map_or(ArgShape::Other, ArgShape::Str),
        "template_string" => {
            let interpolated = node
                .named_children(&mut node.walk())
                .any(|c| c.kind() == "template_substitution");
            if interpolated {
                ArgShape::Other
            } else {
                literal_value(node, source).map_or(ArgShape::Other, ArgShape::Str)
            }
        }
        _ => ArgShape::Other,
    }
}

/// The value of a string or template literal: the text between the
/// delimiters with escape sequences decoded.
fn literal_value(node: Node<'_>, source: &str) -> Option<String> {
    let raw = text_of(node, source)?;
    let mut chars = raw.chars();
    chars.next()?;
    chars.next_back()?;
    Some(unescape(chars.as_str()))
}

/// Decode JavaScript escape sequences.  Unknown escapes yield the escaped
/// character; malformed `\x`/`\u` sequences are kept as written.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(|d| d.is_ascii_digit()) => out.push('\0'),
            // line continuation
            '\n' => {}
            '\r' => {
                let _ = chars.next_if_eq(&'\n');
            }
            'x' => {
                let hex: String = chars.clone().take(2).collect();
                match decode_hex(&hex, 2) {
                    Some(ch) => {
                        out.push(ch);
                        chars.nth(1);
                    }
                    None => out.push_str("\\x"),
                }
            }
            'u' if chars.peek() == Some(&'{') => {
                let braced: String = chars.clone().skip(1).take_while(|&d| d != '}').collect();
                let closed = chars.clone().nth(1 + braced.len()) == Some('}');
                match decode_hex(&braced, braced.len()).filter(|_| closed && !braced.is_empty()) {
                    Some(ch) => {
                        chars.nth(braced.len() + 1);
                        out.push(ch);
                    }
                    None => out.push_str("\\u"),
                }
            }
            'u' => {
                let hex: String = chars.clone().take(4).collect();
                match decode_hex(&hex, 4) {
                    Some(ch) => {
                        out.push(ch);
                        chars.nth(3);
                    }
                    None => out.push_str("\\u"),
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn decode_hex(digits: &str, len: usize) -> Option<char> {
    if digits.len() != len || !digits.chars().all(|d| d.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
}

/// Lazy search for a call whose callee is a member access rooted at the
/// identifier `expect`, e.g. `expect(x).toBe(y)` or `expect.assertions(1)`.
fn has_expect_call(node: Node<'_>, source: &str) -> bool {
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        if n.kind() == "call_expression" {
            let rooted = n
                .child_by_field_name("function")
                .filter(|f| f.kind() == "member_expression")
                .and_then(|f| root_identifier(f, source));
            if rooted == Some("expect") {
                return true;
            }
        }
        let mut cursor = n.walk();
        stack.extend(n.children(&mut cursor));
    }
    false
}

fn root_identifier<'s>(mut node: Node<'_>, source: &'s str) -> Option<&'s str> {
    loop {
        node = match node.kind() {
            "identifier" => return text_of(node, source),
            "member_expression" => node.child_by_field_name("object")?,
            "call_expression" => node.child_by_field_name("function")?,
            "non_null_expression" | "parenthesized_expression" => node.named_child(0)?,
            _ => return None,
        };
    }
}

fn text_of<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    source.get(node.byte_range())
}
