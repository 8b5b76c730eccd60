use std::fmt;
use std::path::Path;

/// Grammar dialects a test file may be written in.
///
/// `JavaScript` is the untyped superset (JSX included). `TypeScript`
/// covers type annotations; `.tsx` files and the un-hinted fallback use
/// the TSX flavour of the grammar so JSX keeps parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    JavaScript,
    TypeScript,
    Tsx,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::JavaScript => "javascript",
            Dialect::TypeScript => "typescript",
            Dialect::Tsx        => "tsx",
        })
    }
}

impl Dialect {
    /// The tree-sitter grammar for this dialect.
    pub fn ts_language(self) -> tree_sitter::Language {
        match self {
            Dialect::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx        => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Parse attempt order for a file: the extension picks the first
    /// dialect, the other family is always tried as a fallback.
    pub fn attempt_order(path: Option<&Path>) -> [Dialect; 2] {
        let ext = path
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .unwrap_or("");
        match ext {
            "ts" | "mts" | "cts" => [Dialect::TypeScript, Dialect::JavaScript],
            "tsx"                => [Dialect::Tsx, Dialect::JavaScript],
            _                    => [Dialect::JavaScript, Dialect::Tsx],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typescript_extensions_try_typescript_first() {
        for name in ["a.test.ts", "a.spec.mts", "a.cts"] {
            let order = Dialect::attempt_order(Some(Path::new(name)));
            assert_eq!(order, [Dialect::TypeScript, Dialect::JavaScript], "{name}");
        }
        assert_eq!(
            Dialect::attempt_order(Some(Path::new("Button.test.tsx"))),
            [Dialect::Tsx, Dialect::JavaScript]
        );
    }

    #[test]
    fn unknown_or_missing_extension_tries_javascript_first() {
        assert_eq!(Dialect::attempt_order(None), [Dialect::JavaScript, Dialect::Tsx]);
        assert_eq!(
            Dialect::attempt_order(Some(Path::new("a.test.js"))),
            [Dialect::JavaScript, Dialect::Tsx]
        );
    }

    #[test]
    fn every_dialect_loads_into_a_parser() {
        for dialect in [Dialect::JavaScript, Dialect::TypeScript, Dialect::Tsx] {
            let mut parser = tree_sitter::Parser::new();
            assert!(parser.set_language(&dialect.ts_language()).is_ok(), "{dialect}");
        }
    }
}
