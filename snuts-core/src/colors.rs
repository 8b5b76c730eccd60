use crate::smell::Severity;

/// Dependency-injection seam for severity color mapping.
///
/// The built-in implementation is [`DefaultTheme`].
pub trait ColorTheme: Send + Sync {
    /// Terminal color name accepted by the `colored` crate (e.g. `"yellow"`).
    fn terminal_color(&self, severity: Severity) -> &'static str;
}

pub struct DefaultTheme;

impl ColorTheme for DefaultTheme {
    fn terminal_color(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Warning => "yellow",
            Severity::Info    => "cyan",
        }
    }
}

impl Severity {
    /// Terminal color name (delegates to [`DefaultTheme`]).
    pub fn terminal_color(self) -> &'static str {
        DefaultTheme.terminal_color(self)
    }
}
