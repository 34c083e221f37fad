//! Configuration file discovery, reading and writing.
//!
//! Files are read as JSON5 (comments and trailing commas allowed; plain
//! JSON is a subset) and written back as pretty-printed JSON.
//!
//! # File Locations
//!
//! Searched in this order, first hit wins:
//!
//! 1. Working directory: `./loanboard.json5`, `./loanboard.json`
//! 2. User config directory: `~/.config/loanboard/config.json5`,
//!    `~/.config/loanboard/config.json`

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, Result};

/// File names looked up in the working directory, in priority order.
const LOCAL_FILE_NAMES: &[&str] = &["loanboard.json5", "loanboard.json"];

/// Directory under the platform config dir holding the user config.
const USER_CONFIG_DIR: &str = "loanboard";

/// File names looked up in the user config directory, in priority order.
const USER_FILE_NAMES: &[&str] = &["config.json5", "config.json"];

/// Lists every place a config file may live, highest priority first.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use loanboard_config::persistence::config_candidates;
///
/// let candidates = config_candidates(Path::new("/work"), Some(Path::new("/home/me/.config/loanboard")));
/// assert_eq!(candidates.len(), 4);
/// assert_eq!(candidates[0], Path::new("/work/loanboard.json5"));
/// ```
#[must_use]
pub fn config_candidates(local_dir: &Path, user_dir: Option<&Path>) -> Vec<PathBuf> {
    let local = LOCAL_FILE_NAMES.iter().map(|name| local_dir.join(name));
    let user = user_dir
        .into_iter()
        .flat_map(|dir| USER_FILE_NAMES.iter().map(move |name| dir.join(name)));
    local.chain(user).collect()
}

/// Returns the first existing file among `candidates`.
#[must_use]
pub fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|path| path.is_file()).cloned()
}

/// Finds the configuration file for the current process.
///
/// Looks in the working directory, then in the user config directory.
/// Returns `None` if neither holds a config file.
#[must_use]
pub fn find_config_file() -> Option<PathBuf> {
    let user_dir = user_config_dir().ok();
    let candidates = config_candidates(Path::new("."), user_dir.as_deref());
    let found = first_existing(&candidates);
    debug!(path = ?found, "config file lookup");
    found
}

/// Returns the user configuration directory, typically
/// `~/.config/loanboard/` on Unix systems.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn user_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join(USER_CONFIG_DIR))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Reads and parses a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its content does not
/// parse into `T`.
///
/// # Examples
///
/// ```no_run
/// use loanboard_config::persistence::read_config_file;
/// use loanboard_config::Config;
///
/// # fn main() -> loanboard_config::Result<()> {
/// let config: Config = read_config_file("loanboard.json5")?;
/// # Ok(())
/// # }
/// ```
pub fn read_config_file<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json5::from_str(&content).map_err(ConfigError::from)
}

/// Writes a value as pretty JSON, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be written, or the
/// value cannot be serialized.
pub fn write_config_file<T: serde::Serialize>(path: impl AsRef<Path>, config: &T) -> Result<()> {
    let path = path.as_ref();
    let write_err = |source| ConfigError::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut content = serde_json::to_string_pretty(config)?;
    content.push('\n');
    std::fs::write(path, content).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        value: i32,
    }

    #[test]
    fn candidates_without_user_dir() {
        let candidates = config_candidates(Path::new("here"), None);
        assert_eq!(
            candidates,
            [PathBuf::from("here/loanboard.json5"), PathBuf::from("here/loanboard.json")]
        );
    }

    #[test]
    fn local_file_wins_over_user_file() {
        let local = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        std::fs::write(local.path().join("loanboard.json"), "{}").unwrap();
        std::fs::write(user.path().join("config.json5"), "{}").unwrap();

        let candidates = config_candidates(local.path(), Some(user.path()));
        assert_eq!(
            first_existing(&candidates),
            Some(local.path().join("loanboard.json"))
        );
    }

    #[test]
    fn json5_preferred_over_json() {
        let user = TempDir::new().unwrap();
        std::fs::write(user.path().join("config.json"), "{}").unwrap();
        std::fs::write(user.path().join("config.json5"), "{}").unwrap();

        let empty = TempDir::new().unwrap();
        let candidates = config_candidates(empty.path(), Some(user.path()));
        assert_eq!(
            first_existing(&candidates),
            Some(user.path().join("config.json5"))
        );
    }

    #[test]
    fn nothing_found() {
        let empty = TempDir::new().unwrap();
        let candidates = config_candidates(empty.path(), Some(empty.path()));
        assert_eq!(first_existing(&candidates), None);
    }

    #[test]
    fn directory_named_like_config_is_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("loanboard.json5")).unwrap();
        let candidates = config_candidates(dir.path(), None);
        assert_eq!(first_existing(&candidates), None);
    }

    #[test]
    fn read_json5_with_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.json5");
        std::fs::write(
            &path,
            r#"
            {
                // comment
                name: "board",
                value: 3,
            }
            "#,
        )
        .unwrap();

        let sample: Sample = read_config_file(&path).unwrap();
        assert_eq!(sample, Sample { name: "board".into(), value: 3 });
    }

    #[test]
    fn read_missing_file_reports_path() {
        let err = read_config_file::<Sample>("/nonexistent/loanboard.json").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
        assert!(err.to_string().contains("/nonexistent/loanboard.json"));
    }

    #[test]
    fn read_invalid_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not valid json").unwrap();

        assert!(matches!(
            read_config_file::<Sample>(&path),
            Err(ConfigError::ParseJson5(_))
        ));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let sample = Sample { name: "x".into(), value: 1 };
        write_config_file(&path, &sample).unwrap();

        let loaded: Sample = read_config_file(&path).unwrap();
        assert_eq!(loaded, sample);
    }
}
