/// Structural node selector evaluated by [`super::TreeService::query`].
///
/// Selectors compose: `Selector::kind(&["if_statement"]).inside(Selector::TestCase)`
/// picks every `if` nested anywhere below a test case.
#[derive(Debug, Clone)]
pub enum Selector {
    /// Nodes whose grammar kind is one of these.
    Kind(Vec<&'static str>),
    /// Call expressions whose callee resolves to one of these names,
    /// whatever their arguments look like.
    Call(Vec<String>),
    /// Calls classified as test cases (name and shape).
    TestCase,
    /// Calls classified as suites.
    Suite,
    /// Calls classified as lifecycle hooks.
    Hook,
    /// Any function value.
    Function,
    /// Nodes with a strict ancestor matching the inner selector.
    Inside(Box<Selector>),
    /// Nodes with a strict descendant matching the inner selector.
    Has(Box<Selector>),
    /// Nodes matching every selector.
    All(Vec<Selector>),
    Not(Box<Selector>),
}

impl Selector {
    pub fn kind(kinds: &[&'static str]) -> Self {
        Selector::Kind(kinds.to_vec())
    }

    pub fn call<S: AsRef<str>>(names: &[S]) -> Self {
        Selector::Call(names.iter().map(|n| n.as_ref().to_string()).collect())
    }

    /// Narrow to nodes nested within a node matching `outer`.
    pub fn inside(self, outer: Selector) -> Self {
        self.and(Selector::Inside(Box::new(outer)))
    }

    /// Narrow to nodes not nested within any node matching `outer`.
    pub fn outside(self, outer: Selector) -> Self {
        self.and(Selector::Not(Box::new(Selector::Inside(Box::new(outer)))))
    }

    /// Narrow to nodes containing a node matching `inner`.
    pub fn having(self, inner: Selector) -> Self {
        self.and(Selector::Has(Box::new(inner)))
    }

    pub fn and(self, other: Selector) -> Self {
        match self {
            Selector::All(mut parts) => {
                parts.push(other);
                Selector::All(parts)
            }
            first => Selector::All(vec![first, other]),
        }
    }
}
