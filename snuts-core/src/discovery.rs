//! Test-file discovery: which files under the configured roots are test
//! files, both for the initial walk and for filtering live events.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::config::SnutsConfig;
use crate::error::ConfigError;
use crate::ignore_rules::{IgnoreConfig, IgnoreRules};

/// Source extensions considered for test files.
pub const TEST_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

/// Dependency and build-output directories, never descended into.
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", "dist", "build", "coverage", ".git"];

const NAME_PATTERNS: &[&str] = &[
    "*.test", "*.tests", "*.spec", "*.specs", "*test_*", "*test-*", "*Spec*",
];

/// The built-in glob list: every naming convention for every extension.
pub fn test_file_patterns() -> Vec<String> {
    NAME_PATTERNS
        .iter()
        .flat_map(|name| TEST_EXTENSIONS.iter().map(move |ext| format!("**/{name}.{ext}")))
        .collect()
}

pub struct Discovery {
    roots: Vec<PathBuf>,
    matcher: GlobSet,
    ignore: Box<dyn IgnoreRules>,
}

impl Discovery {
    /// Discovery with the built-in patterns.
    pub fn new(roots: &[PathBuf], ignore: Box<dyn IgnoreRules>) -> Result<Self, ConfigError> {
        Self::with_patterns(roots, &test_file_patterns(), ignore)
    }

    /// Built-in patterns plus the ignore rules of a loaded `.snuts`.
    pub fn from_config(roots: &[PathBuf], config: &SnutsConfig) -> Result<Self, ConfigError> {
        let ignore = IgnoreConfig::new(config.root.clone(), &config.ignore);
        Self::new(roots, Box::new(ignore))
    }

    pub fn with_patterns(
        roots: &[PathBuf],
        patterns: &[String],
        ignore: Box<dyn IgnoreRules>,
    ) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            builder.add(glob);
        }
        let matcher = builder.build().map_err(|source| ConfigError::InvalidPattern {
            pattern: patterns.join(", "),
            source,
        })?;

        let roots = roots
            .iter()
            .filter_map(|root| match std::fs::canonicalize(root) {
                Ok(abs) => Some(abs),
                Err(err) => {
                    warn!(path = %root.display(), error = %err, "skipping path");
                    None
                }
            })
            .collect();

        Ok(Self {
            roots,
            matcher,
            ignore,
        })
    }

    /// Absolute, canonical roots (missing paths were dropped).
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// `true` when `path` lies under a root, outside excluded directories,
    /// is not ignored, and matches a test-file pattern.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(root) = self.roots.iter().find(|r| path.starts_with(r)) else {
            return false;
        };
        let rel = match path.strip_prefix(root) {
            Ok(rel) if rel.as_os_str().is_empty() => match path.file_name() {
                Some(name) => Path::new(name),
                None => return false,
            },
            Ok(rel) => rel,
            Err(_) => return false,
        };
        if in_excluded_dir(rel) || self.ignore.is_ignored(path) {
            return false;
        }
        self.matcher.is_match(rel)
    }

    /// Every accepted file under every root, deduplicated and sorted.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut found = BTreeSet::new();
        for root in &self.roots {
            if root.is_file() {
                if self.accepts(root) {
                    found.insert(root.clone());
                }
                continue;
            }

            let mut walker = WalkBuilder::new(root);
            walker.hidden(false);
            self.ignore.configure_walker(&mut walker);
            walker.filter_entry(|entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && entry.depth() > 0 && is_excluded_name(entry.file_name()))
            });

            for entry in walker.build() {
                let entry = match entry {
                    Ok(e) => e,
                    Err(err) => {
                        debug!(error = %err, "walk error");
                        continue;
                    }
                };
                let path = entry.path();
                if entry.file_type().is_some_and(|t| t.is_file()) && self.accepts(path) {
                    found.insert(path.to_path_buf());
                }
            }
        }
        found.into_iter().collect()
    }
}

fn is_excluded_name(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| EXCLUDED_DIRS.contains(&n))
}

fn in_excluded_dir(rel: &Path) -> bool {
    rel.parent().is_some_and(|dirs| {
        dirs.components()
            .any(|c| matches!(c, Component::Normal(n) if is_excluded_name(n)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ignore_rules::{AllowAll, PatternIgnore};

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "it('x y z', () => {});\n").unwrap();
        path
    }

    fn rel_names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        let root = std::fs::canonicalize(root).unwrap();
        files
            .iter()
            .map(|f| f.strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn pattern_list_covers_every_convention_and_extension() {
        let patterns = test_file_patterns();
        assert_eq!(patterns.len(), NAME_PATTERNS.len() * TEST_EXTENSIONS.len());
        assert!(patterns.contains(&"**/*.spec.ts".to_string()));
        assert!(patterns.contains(&"**/*Spec*.jsx".to_string()));
    }

    #[test]
    fn finds_test_files_and_skips_excluded_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for rel in [
            "src/sum.test.js",
            "src/deep/api.spec.ts",
            "src/test_utils.js",
            "src/test-helpers.tsx",
            "src/UserSpec.jsx",
            "src/plain.js",
            "src/notes.test.md",
            "node_modules/pkg/index.test.js",
            "dist/bundle.spec.js",
            "coverage/x.test.js",
        ] {
            touch(root, rel);
        }

        let discovery = Discovery::new(&[root.to_path_buf()], Box::new(AllowAll)).unwrap();
        let files = discovery.files();
        assert_eq!(
            rel_names(root, &files),
            vec![
                "src/UserSpec.jsx",
                "src/deep/api.spec.ts",
                "src/sum.test.js",
                "src/test-helpers.tsx",
                "src/test_utils.js",
            ]
        );
        assert!(files.iter().all(|f| f.is_absolute()));
    }

    #[test]
    fn overlapping_roots_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(dir.path(), "a/b.test.js");
        let discovery = Discovery::new(
            &[dir.path().to_path_buf(), dir.path().join("a"), file],
            Box::new(AllowAll),
        )
        .unwrap();
        assert_eq!(discovery.files().len(), 1);
    }

    #[test]
    fn a_root_that_is_a_test_file_is_included() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(dir.path(), "only.spec.js");
        let discovery = Discovery::new(&[file.clone()], Box::new(AllowAll)).unwrap();
        assert_eq!(discovery.files(), vec![std::fs::canonicalize(file).unwrap()]);
    }

    #[test]
    fn accepts_filters_live_paths() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/a.test.js");
        let discovery = Discovery::new(
            &[dir.path().to_path_buf()],
            Box::new(PatternIgnore(vec!["legacy".into()])),
        )
        .unwrap();
        let root = &discovery.roots()[0];
        assert!(discovery.accepts(&root.join("src/a.test.js")));
        assert!(!discovery.accepts(&root.join("src/a.js")));
        assert!(!discovery.accepts(&root.join("node_modules/a.test.js")));
        assert!(!discovery.accepts(&root.join("legacy/a.test.js")));
        assert!(!discovery.accepts(Path::new("/elsewhere/a.test.js")));
    }

    #[test]
    fn gitignored_files_are_skipped_during_the_walk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "generated/\n").unwrap();
        touch(dir.path(), "generated/x.test.js");
        touch(dir.path(), "src/y.test.js");
        let config = SnutsConfig {
            root: std::fs::canonicalize(dir.path()).unwrap(),
            ..SnutsConfig::default()
        };
        let discovery = Discovery::from_config(&[dir.path().to_path_buf()], &config).unwrap();
        assert_eq!(rel_names(dir.path(), &discovery.files()), vec!["src/y.test.js"]);
    }

    #[test]
    fn anchored_patterns_apply_when_config_is_loaded_by_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".snuts"), "[ignore]\npatterns = [\"/src/legacy/\"]\n").unwrap();
        touch(dir.path(), "src/legacy/old.test.js");
        touch(dir.path(), "src/new.test.js");

        // The same file, spelled relative to the working directory.
        let cwd = std::env::current_dir().unwrap();
        let mut relative = PathBuf::from(".");
        for _ in cwd.components().skip(1) {
            relative.push("..");
        }
        let relative = relative.join(dir.path().strip_prefix("/").unwrap()).join(".snuts");
        assert!(relative.is_relative());

        let by_relative = SnutsConfig::from_file(&relative).unwrap();
        let by_absolute = SnutsConfig::from_file(&dir.path().join(".snuts")).unwrap();
        assert!(by_relative.root.is_absolute());
        assert_eq!(by_relative.root, by_absolute.root);

        let roots = [dir.path().to_path_buf()];
        let discovery = Discovery::from_config(&roots, &by_relative).unwrap();
        assert_eq!(rel_names(dir.path(), &discovery.files()), vec!["src/new.test.js"]);
        let root = &discovery.roots()[0];
        assert!(!discovery.accepts(&root.join("src/legacy/old.test.js")));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = Discovery::with_patterns(&[], &["a[".to_string()], Box::new(AllowAll))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn missing_roots_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let discovery =
            Discovery::new(&[dir.path().join("nope")], Box::new(AllowAll)).unwrap();
        assert!(discovery.roots().is_empty());
        assert!(discovery.files().is_empty());
    }
}
