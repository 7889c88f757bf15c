//! `.tabfile.toml` configuration.
//!
//! ```toml
//! [tsv]
//! skip_errors = false
//!
//! [progress]
//! log_every = 100000
//! ```
//!
//! Every section and key is optional. A missing file yields the defaults; an
//! unreadable or invalid file is reported with a warning and also yields the
//! defaults.

use crate::errors::{FileUtilError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".tabfile.toml";

/// How many directories to climb when searching for a config file.
const MAX_TRAVERSAL_DEPTH: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TabfileConfig {
    #[serde(default)]
    pub tsv: TsvConfig,
    #[serde(default)]
    pub progress: ProgressSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TsvConfig {
    /// Drop malformed key/value lines instead of failing.
    #[serde(default)]
    pub skip_errors: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgressSettings {
    /// Log the line count every N lines; 0 disables.
    #[serde(default = "default_log_every")]
    pub log_every: usize,
}

fn default_log_every() -> usize {
    100_000
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            log_every: default_log_every(),
        }
    }
}

/// Parse configuration from TOML text.
pub fn parse_config(contents: &str) -> std::result::Result<TabfileConfig, toml::de::Error> {
    toml::from_str(contents)
}

/// Read and parse a config file.
///
/// # Errors
///
/// Returns `FileUtilError::Io` if the file can't be read and
/// `FileUtilError::Config` if it isn't valid.
pub fn read_config_file(path: &Path) -> Result<TabfileConfig> {
    let contents = fs::read_to_string(path).map_err(|e| FileUtilError::io_with_path(e, path))?;
    parse_config(&contents).map_err(|e| FileUtilError::config_with_path(e.to_string(), path))
}

/// Try one candidate path; `None` if it is missing or unusable.
fn try_load_config_from_path(path: &Path) -> Option<TabfileConfig> {
    match read_config_file(path) {
        Ok(config) => {
            log::debug!("Loaded config from {}", path.display());
            Some(config)
        }
        Err(e) if e.io_kind_of() == Some(std::io::ErrorKind::NotFound) => None,
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Load configuration from `explicit` if given, else search the current
/// directory and its ancestors for `.tabfile.toml`.
///
/// An explicit path that cannot be used falls back to the defaults with a
/// warning.
pub fn load_config(explicit: Option<&Path>) -> TabfileConfig {
    if let Some(path) = explicit {
        return match read_config_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}. Using defaults.", e);
                TabfileConfig::default()
            }
        };
    }

    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!("Failed to get current directory: {}. Using default config.", e);
            return TabfileConfig::default();
        }
    };

    directory_ancestors(current, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TabfileConfig::default();
        assert!(!config.tsv.skip_errors);
        assert_eq!(config.progress.log_every, 100_000);
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(indoc! {r#"
            [tsv]
            skip_errors = true

            [progress]
            log_every = 10
        "#})
        .unwrap();
        assert!(config.tsv.skip_errors);
        assert_eq!(config.progress.log_every, 10);
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = parse_config("[tsv]\nskip_errors = true\n").unwrap();
        assert!(config.tsv.skip_errors);
        assert_eq!(config.progress.log_every, 100_000);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(parse_config("[tsv]\nskip_errrors = true\n").is_err());
    }

    #[test]
    fn test_read_config_file_reports_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[progress]\nlog_every = \"often\"\n").unwrap();

        let err = read_config_file(&path).unwrap_err();
        assert_eq!(err.category(), "Config");
        assert_eq!(err.path(), Some(path.as_path()));
    }

    #[test]
    fn test_load_explicit_invalid_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "not toml at all [").unwrap();
        assert_eq!(load_config(Some(path.as_path())), TabfileConfig::default());
    }

    #[test]
    fn test_load_explicit_valid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[progress]\nlog_every = 0\n").unwrap();
        assert_eq!(load_config(Some(path.as_path())).progress.log_every, 0);
    }

    #[test]
    fn test_directory_ancestors_is_bounded() {
        let start = PathBuf::from("/a/b/c/d");
        let dirs: Vec<_> = directory_ancestors(start, 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c/d"), PathBuf::from("/a/b/c")]);
    }
}
