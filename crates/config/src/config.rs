//! Core configuration struct and loading logic.
//!
//! This module provides the main [`Config`] struct which aggregates all
//! configuration options for loanboard.

use std::path::Path;

use loanboard_protocol::{Column, Columns};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::ApiConfig;
use crate::error::{ConfigError, Result};
use crate::persistence::{find_config_file, read_config_file, write_config_file};

/// Environment variable overriding [`ApiConfig::base_url`].
pub const ENV_API_URL: &str = "LOANBOARD_API_URL";

/// Environment variable overriding [`Config::default_loan`].
pub const ENV_LOAN: &str = "LOANBOARD_LOAN";

/// The main configuration struct.
///
/// # Examples
///
/// ```
/// use loanboard_config::{ApiConfig, Config};
///
/// let config = Config::default();
/// assert_eq!(config.columns.len(), 4);
/// assert!(config.default_loan.is_none());
///
/// let config = Config {
///     api: ApiConfig::with_base_url("https://loans.example.com/api/"),
///     default_loan: Some(12),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Where the task API lives.
    #[serde(default)]
    pub api: ApiConfig,

    /// Board columns, left to right. Keys must match backend status values.
    #[serde(default = "default_columns")]
    pub columns: Vec<Column>,

    /// Loan whose board is opened when none is given explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_loan: Option<u64>,
}

fn default_columns() -> Vec<Column> {
    Columns::loan_workflow().into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            columns: default_columns(),
            default_loan: None,
        }
    }
}

impl Config {
    /// Loads configuration from the default file locations, then applies
    /// environment overrides.
    ///
    /// If no configuration file is found, starts from the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file is found but cannot be read or parsed, an
    /// environment override is malformed, or the result fails validation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use loanboard_config::Config;
    ///
    /// # fn example() -> loanboard_config::Result<()> {
    /// let config = Config::load()?;
    /// println!("API at {}", config.api.base_url);
    /// # Ok(())
    /// # }
    /// ```
    pub fn load() -> Result<Self> {
        Self::load_with(None, |name| std::env::var(name).ok())
    }

    /// Loads configuration from a specific file, then applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the result
    /// fails validation.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(Some(path.as_ref()), |name| std::env::var(name).ok())
    }

    /// Loads configuration from `path`, or the default locations when
    /// `None`, applies the overrides returned by `lookup`, then validates
    /// the result once.
    ///
    /// Callers with their own overrides (command-line flags) layer them into
    /// `lookup`, so a bad value from a lower-priority source can still be
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, an override is
    /// malformed, or the result fails validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use loanboard_config::{Config, ENV_LOAN};
    ///
    /// # fn example(path: &std::path::Path) -> loanboard_config::Result<()> {
    /// let config = Config::load_with(Some(path), |name| {
    ///     (name == ENV_LOAN).then(|| "12".to_string())
    /// })?;
    /// assert_eq!(config.default_loan, Some(12));
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.map(Path::to_path_buf).or_else(find_config_file);
        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "loading config file");
                read_config_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to a file as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        write_config_file(path, self)
    }

    /// Applies environment overrides using `lookup` to read variables.
    ///
    /// Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if [`ENV_LOAN`] is not a number.
    ///
    /// # Examples
    ///
    /// ```
    /// use loanboard_config::Config;
    ///
    /// let mut config = Config::default();
    /// config
    ///     .apply_env(|name| match name {
    ///         "LOANBOARD_API_URL" => Some("http://10.0.0.5/api/".to_string()),
    ///         "LOANBOARD_LOAN" => Some("31".to_string()),
    ///         _ => None,
    ///     })
    ///     .unwrap();
    /// assert_eq!(config.api.base_url, "http://10.0.0.5/api/");
    /// assert_eq!(config.default_loan, Some(31));
    /// ```
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = read(ENV_API_URL) {
            debug!(%url, "API URL overridden from environment");
            self.api.base_url = url;
        }

        if let Some(raw) = read(ENV_LOAN) {
            let loan = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_LOAN,
                value: raw.clone(),
            })?;
            self.default_loan = Some(loan);
        }

        Ok(())
    }

    /// Returns the validated column set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidColumns`] if the list is empty or has
    /// duplicate keys.
    pub fn column_set(&self) -> Result<Columns> {
        Columns::new(self.columns.clone()).map_err(ConfigError::InvalidColumns)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API settings or the columns are invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use loanboard_config::Config;
    ///
    /// let mut config = Config::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.columns.clear();
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.column_set()?;
        Ok(())
    }
}
