//! Path-based ignore rules for test-file discovery and live events.
//!
//! Discovery and the watcher depend only on the [`IgnoreRules`] trait.
//! [`IgnoreConfig`] is the production implementation built from the
//! `[ignore]` section of `.snuts`; [`AllowAll`] and [`PatternIgnore`] are
//! filesystem-free doubles for tests.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;
use tracing::warn;

use crate::config::IgnoreSection;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

pub trait IgnoreRules: Send + Sync {
    /// Return `true` if this path should never be analyzed.
    fn is_ignored(&self, path: &Path) -> bool;

    /// Apply walker-level settings (gitignore handling) before a directory
    /// walk.  The default leaves the walker's own gitignore support off so
    /// only [`is_ignored`](IgnoreRules::is_ignored) decides.
    fn configure_walker(&self, walker: &mut WalkBuilder) {
        walker
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .ignore(false);
    }
}

// ---------------------------------------------------------------------------
// AllowAll
// ---------------------------------------------------------------------------

/// Permits all paths.
pub struct AllowAll;

impl IgnoreRules for AllowAll {
    #[inline]
    fn is_ignored(&self, _path: &Path) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// PatternIgnore
// ---------------------------------------------------------------------------

/// Ignores paths whose display string contains any of the given substrings.
///
/// ```
/// use snuts_core::ignore_rules::{IgnoreRules, PatternIgnore};
/// use std::path::Path;
///
/// let rules = PatternIgnore(vec!["fixtures".into()]);
/// assert!(rules.is_ignored(Path::new("/project/fixtures/a.test.js")));
/// assert!(!rules.is_ignored(Path::new("/project/src/a.test.js")));
/// ```
pub struct PatternIgnore(pub Vec<String>);

impl IgnoreRules for PatternIgnore {
    fn is_ignored(&self, path: &Path) -> bool {
        let s = path.to_string_lossy();
        self.0.iter().any(|p| s.contains(p.as_str()))
    }
}

// ---------------------------------------------------------------------------
// IgnoreConfig
// ---------------------------------------------------------------------------

/// `.gitignore` plus the extra `[ignore] patterns` from `.snuts`.
///
/// During a walk the walker applies nested `.gitignore` files natively and
/// [`is_ignored`](IgnoreRules::is_ignored) is the secondary filter.  For
/// single paths (live events) `is_ignored` checks the root `.gitignore` and
/// the extra patterns together.
pub struct IgnoreConfig {
    root: PathBuf,
    use_gitignore: bool,
    use_global_gitignore: bool,
    combined: Gitignore,
}

impl IgnoreConfig {
    pub fn new(root: PathBuf, section: &IgnoreSection) -> Self {
        let combined = build_combined(&root, &section.patterns, section.use_gitignore);
        Self {
            root,
            use_gitignore: section.use_gitignore,
            use_global_gitignore: section.use_global_gitignore,
            combined,
        }
    }
}

impl IgnoreRules for IgnoreConfig {
    /// Uses `matched_path_or_any_parents` so a file inside an ignored
    /// directory is reported as ignored.
    fn is_ignored(&self, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(&self.root) else {
            return false;
        };
        self.combined
            .matched_path_or_any_parents(rel, path.is_dir())
            .is_ignore()
    }

    fn configure_walker(&self, walker: &mut WalkBuilder) {
        walker
            .git_ignore(self.use_gitignore)
            .git_global(self.use_global_gitignore)
            .git_exclude(self.use_gitignore)
            .require_git(false)
            .ignore(false);
    }
}

/// Root `.gitignore` (when enabled) combined with the extra patterns.
fn build_combined(root: &Path, patterns: &[String], use_gitignore: bool) -> Gitignore {
    let mut b = GitignoreBuilder::new(root);
    if use_gitignore {
        let gi = root.join(".gitignore");
        if gi.is_file() {
            if let Some(err) = b.add(&gi) {
                warn!(file = %gi.display(), error = %err, "partially unreadable .gitignore");
            }
        }
    }
    for p in patterns {
        if let Err(err) = b.add_line(None, p) {
            warn!(pattern = %p, error = %err, "skipping ignore pattern");
        }
    }
    b.build().unwrap_or_else(|err| {
        warn!(error = %err, "ignore rules unusable; ignoring nothing");
        Gitignore::empty()
    })
}
