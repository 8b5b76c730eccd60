//! `.snuts` project configuration.
//!
//! Every section and every key is optional; a missing file means defaults.
//!
//! ```toml
//! [aliases]
//! tests  = ["it", "test"]
//! suites = ["describe"]
//! hooks  = ["beforeAll", "beforeEach", "afterAll", "afterEach"]
//!
//! [detectors]
//! max_comments_per_test = 5
//! max_anonymous_words   = 2
//! disabled = ["assertionless-test"]
//!
//! [watch]
//! debounce_ms = 200
//! concurrency = 10
//!
//! [ignore]
//! patterns = ["fixtures/"]
//! use_gitignore = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::tree::shape::Aliases;

pub const CONFIG_FILE: &str = ".snuts";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SnutsConfig {
    pub aliases: Aliases,
    pub detectors: DetectorSettings,
    pub watch: WatchSettings,
    pub ignore: IgnoreSection,
    /// Directory the config was loaded from; relative ignore patterns are
    /// anchored here.
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Overcommented fires above this many comments.
    pub max_comments_per_test: usize,
    /// AnonymousTest fires at or below this many words.
    pub max_anonymous_words: usize,
    /// Detector names to leave out of the default set.
    pub disabled: Vec<String>,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            max_comments_per_test: 5,
            max_anonymous_words: 2,
            disabled: vec![],
        }
    }
}

impl DetectorSettings {
    pub fn is_enabled(&self, name: &str) -> bool {
        !self.disabled.iter().any(|d| d == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    pub debounce_ms: u64,
    pub concurrency: usize,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            concurrency: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IgnoreSection {
    /// Additional gitignore-style patterns to exclude.
    pub patterns: Vec<String>,
    /// Respect the project's `.gitignore`.
    pub use_gitignore: bool,
    /// Respect the global gitignore (`~/.config/git/ignore`, etc.).
    pub use_global_gitignore: bool,
}

impl Default for IgnoreSection {
    fn default() -> Self {
        Self {
            patterns: vec![],
            use_gitignore: true,
            use_global_gitignore: true,
        }
    }
}

impl SnutsConfig {
    /// Discover the nearest `.snuts` walking upward from `start` to the git
    /// root.  No file found means defaults rooted at the discovery root.
    pub fn load(start: &Path) -> Result<Self, ConfigError> {
        let start = std::fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
        let root = find_config_root(&start);
        let path = root.join(CONFIG_FILE);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self {
                root,
                ..Self::default()
            })
        }
    }

    /// Load an explicit config file.  The file's directory, made absolute,
    /// anchors `[ignore]` patterns.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let path = &std::fs::canonicalize(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: SnutsConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.aliases.validate()?;
        config.root = path.parent().unwrap_or(path).to_path_buf();
        Ok(config)
    }
}

/// Walk upward from `start` (normalised to a directory) looking for a
/// `.snuts` file or a `.git` directory.  Returns the first match, or
/// `start` itself if neither is found before the filesystem root.
pub fn find_config_root(start: &Path) -> PathBuf {
    let dir = if start.is_file() {
        start.parent().unwrap_or(start)
    } else {
        start
    };

    let mut current = dir;
    loop {
        if current.join(CONFIG_FILE).is_file() || current.join(".git").is_dir() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(p) => current = p,
            None => return dir.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let cfg = SnutsConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.root, std::fs::canonicalize(dir.path()).unwrap());
        assert_eq!(cfg.detectors.max_comments_per_test, 5);
        assert_eq!(cfg.detectors.max_anonymous_words, 2);
        assert_eq!(cfg.watch, WatchSettings { debounce_ms: 200, concurrency: 10 });
        assert_eq!(cfg.aliases, Aliases::default());
        assert!(cfg.ignore.use_gitignore);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[detectors]\nmax_comments_per_test = 8\ndisabled = [\"overcommented\"]\n\n[aliases]\ntests = [\"it\", \"specify\"]\n",
        )
        .unwrap();
        let cfg = SnutsConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.detectors.max_comments_per_test, 8);
        assert_eq!(cfg.detectors.max_anonymous_words, 2);
        assert!(!cfg.detectors.is_enabled("overcommented"));
        assert!(cfg.detectors.is_enabled("anonymous-test"));
        assert_eq!(cfg.aliases.tests, vec!["it", "specify"]);
        assert_eq!(cfg.aliases.suites, vec!["describe"]);
        assert_eq!(cfg.watch.debounce_ms, 200);
    }

    #[test]
    fn overlapping_aliases_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[aliases]\nsuites = [\"describe\", \"it\"]\n").unwrap();
        assert!(matches!(
            SnutsConfig::from_file(&path),
            Err(ConfigError::OverlappingAliases { .. })
        ));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid toml ][[[").unwrap();
        assert!(matches!(SnutsConfig::from_file(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            SnutsConfig::from_file(&dir.path().join("absent")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn find_config_root_stops_at_git() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let sub = dir.path().join("src");
        std::fs::create_dir(&sub).unwrap();
        assert_eq!(find_config_root(&sub), dir.path());
    }

    #[test]
    fn find_config_root_stops_at_snuts_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
        let sub = dir.path().join("deep/nested");
        std::fs::create_dir_all(&sub).unwrap();
        assert_eq!(find_config_root(&sub), dir.path());
    }
}
