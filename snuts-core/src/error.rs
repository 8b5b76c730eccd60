use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning a file into a [`crate::tree::SourceUnit`].
///
/// None of these are fatal to a watch session: the offending file is
/// skipped and the error is logged at the level returned by
/// [`TreeError::is_warning`].
#[derive(Debug, Error)]
pub enum TreeError {
    /// The source text is empty or whitespace only.
    #[error("source text is empty")]
    EmptyInput,

    /// Every dialect produced a tree containing syntax errors.
    #[error("failed to parse as {dialects}: syntax error at {line}:{column}")]
    Parse {
        dialects: String,
        line: usize,
        column: usize,
    },

    /// The file could not be read (missing, permissions, not UTF-8).
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TreeError {
    /// Empty and unparsable inputs are expected in a live project (files
    /// mid-save, half-written tests) and are logged at warn; I/O failures
    /// are logged at error.
    pub fn is_warning(&self) -> bool {
        !matches!(self, TreeError::Unreadable { .. })
    }
}

/// Failures while loading a `.snuts` configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The same name appears in more than one alias set, which would make
    /// test, suite and hook classification ambiguous.
    #[error("alias `{name}` is listed as both a {first} and a {second} alias")]
    OverlappingAliases {
        name: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("invalid test file pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}
