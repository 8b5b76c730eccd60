//! Parser-independent description of the call shapes that identify tests.
//!
//! The tree service lowers a concrete syntax node into a [`CallShape`] and
//! every classification decision is then made by the pure predicates in
//! this module.  Swapping the parsing library only means rewriting the
//! lowering, never the rules.

use serde::Deserialize;

use crate::error::ConfigError;

/// Property names accepted after an alias, as in `it.skip(...)`.
pub const CALL_MODIFIERS: &[&str] = &["skip", "only", "todo", "concurrent", "failing"];

/// Syntactic flavours of a function value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Declaration,
    Expression,
    Arrow,
    ObjectMethod,
    ClassMethod,
    PrivateClassMethod,
}

/// The resolved callee of a call: `it` or `it.only`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callee {
    pub name: String,
    pub modifier: Option<String>,
}

/// What a single call argument looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgShape {
    /// A string literal (or substitution-free template literal) and its value.
    Str(String),
    Function(FunctionKind),
    Other,
}

/// A call expression reduced to what test classification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallShape {
    /// `None` when the callee is not an identifier or `identifier.property`.
    pub callee: Option<Callee>,
    pub args: Vec<ArgShape>,
}

impl CallShape {
    /// The literal first argument, if there is one.
    pub fn description(&self) -> Option<&str> {
        match self.args.first() {
            Some(ArgShape::Str(s)) => Some(s),
            _ => None,
        }
    }
}

/// Names used to author tests, suites and hooks.
///
/// The three sets must not overlap; [`Aliases::validate`] enforces it so a
/// call can never classify as two things at once.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Aliases {
    pub tests: Vec<String>,
    pub suites: Vec<String>,
    pub hooks: Vec<String>,
}

impl Default for Aliases {
    fn default() -> Self {
        Self {
            tests: vec!["it".into(), "test".into()],
            suites: vec!["describe".into()],
            hooks: vec![
                "beforeAll".into(),
                "beforeEach".into(),
                "afterAll".into(),
                "afterEach".into(),
            ],
        }
    }
}

impl Aliases {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sets: [(&'static str, &[String]); 3] = [
            ("test", &self.tests),
            ("suite", &self.suites),
            ("hook", &self.hooks),
        ];
        for (i, &(first, names)) in sets.iter().enumerate() {
            for &(second, others) in &sets[i + 1..] {
                if let Some(name) = names.iter().find(|&n| others.contains(n)) {
                    return Err(ConfigError::OverlappingAliases {
                        name: name.clone(),
                        first,
                        second,
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// `true` when the callee is one of `names`, bare or with a known modifier.
pub fn callee_matches(callee: &Callee, names: &[String]) -> bool {
    names.iter().any(|n| *n == callee.name)
        && callee
            .modifier
            .as_deref()
            .map_or(true, |m| CALL_MODIFIERS.contains(&m))
}

/// Test and suite shape: a registered name called with a literal
/// description followed by a function.
pub fn is_described_block(shape: &CallShape, names: &[String]) -> bool {
    shape.callee.as_ref().is_some_and(|c| callee_matches(c, names))
        && shape.args.len() >= 2
        && matches!(shape.args[0], ArgShape::Str(_))
        && matches!(shape.args[1], ArgShape::Function(_))
}

/// Hook shape: a registered name whose first argument is a function.
/// Hooks take no description, an optional timeout may follow.
pub fn is_hook_block(shape: &CallShape, names: &[String]) -> bool {
    shape.callee.as_ref().is_some_and(|c| callee_matches(c, names))
        && matches!(shape.args.first(), Some(ArgShape::Function(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, modifier: Option<&str>, args: Vec<ArgShape>) -> CallShape {
        CallShape {
            callee: Some(Callee {
                name: name.into(),
                modifier: modifier.map(Into::into),
            }),
            args,
        }
    }

    fn described(name: &str) -> CallShape {
        call(
            name,
            None,
            vec![ArgShape::Str("does a thing".into()), ArgShape::Function(FunctionKind::Arrow)],
        )
    }

    #[test]
    fn registered_name_with_description_and_callback_matches() {
        let aliases = Aliases::default();
        assert!(is_described_block(&described("it"), &aliases.tests));
        assert!(is_described_block(&described("test"), &aliases.tests));
        assert!(is_described_block(&described("describe"), &aliases.suites));
    }

    #[test]
    fn unrelated_function_with_same_shape_matches_nothing() {
        let aliases = Aliases::default();
        let foo = described("foo");
        assert!(!is_described_block(&foo, &aliases.tests));
        assert!(!is_described_block(&foo, &aliases.suites));
        assert!(!is_hook_block(&foo, &aliases.hooks));
    }

    #[test]
    fn alias_sets_classify_exclusively() {
        let aliases = Aliases::default();
        for shape in [described("it"), described("describe")] {
            let hits = [
                is_described_block(&shape, &aliases.tests),
                is_described_block(&shape, &aliases.suites),
                is_hook_block(&shape, &aliases.hooks),
            ];
            assert_eq!(hits.iter().filter(|h| **h).count(), 1, "{shape:?}");
        }
    }

    #[test]
    fn name_alone_is_not_enough() {
        let aliases = Aliases::default();
        let missing_callback = call("it", None, vec![ArgShape::Str("x".into()), ArgShape::Other]);
        let dynamic_title = call(
            "it",
            None,
            vec![ArgShape::Other, ArgShape::Function(FunctionKind::Expression)],
        );
        let single_arg = call("test", None, vec![ArgShape::Str("x".into())]);
        assert!(!is_described_block(&missing_callback, &aliases.tests));
        assert!(!is_described_block(&dynamic_title, &aliases.tests));
        assert!(!is_described_block(&single_arg, &aliases.tests));
    }

    #[test]
    fn known_modifiers_are_accepted() {
        let aliases = Aliases::default();
        let skipped = call(
            "it",
            Some("skip"),
            vec![ArgShape::Str("x".into()), ArgShape::Function(FunctionKind::Arrow)],
        );
        let each = call(
            "it",
            Some("each"),
            vec![ArgShape::Str("x".into()), ArgShape::Function(FunctionKind::Arrow)],
        );
        assert!(is_described_block(&skipped, &aliases.tests));
        assert!(!is_described_block(&each, &aliases.tests));
    }

    #[test]
    fn hooks_take_a_callback_first() {
        let aliases = Aliases::default();
        let hook = call("beforeEach", None, vec![ArgShape::Function(FunctionKind::Arrow)]);
        assert!(is_hook_block(&hook, &aliases.hooks));
        assert!(!is_described_block(&hook, &aliases.tests));
    }

    #[test]
    fn overlapping_aliases_are_rejected() {
        let aliases = Aliases {
            tests: vec!["it".into(), "check".into()],
            suites: vec!["describe".into()],
            hooks: vec!["check".into()],
        };
        let err = aliases.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::OverlappingAliases { ref name, first: "test", second: "hook" } if name == "check"),
            "{err}"
        );
        assert!(Aliases::default().validate().is_ok());
    }
}
