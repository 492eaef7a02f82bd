//! Core configuration loaded from TOML.
//!
//! # Responsibility
//! - Describe database location, logging and toggle defaults in one place.
//! - Fall back to defaults for anything the file leaves out.
//!
//! # Invariants
//! - Unknown keys are rejected so typos do not silently fall back.
//! - Loading never panics.
//!
//! Example:
//!
//! ```toml
//! database_path = "/var/lib/holiday/holidays.sqlite3"
//!
//! [logging]
//! level = "info"
//! dir = "/var/log/holiday"
//!
//! [toggle]
//! default_kind = "vacation"
//! ```

use crate::model::vacation::VacationKind;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DATABASE_FILE: &str = "holidays.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub database_path: PathBuf,
    pub logging: LoggingConfig,
    pub toggle: ToggleConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            logging: LoggingConfig::default(),
            toggle: ToggleConfig::default(),
        }
    }
}

/// `[logging]` table. Logging stays off unless `dir` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `trace|debug|info|warn|error`; build-mode default when absent.
    pub level: Option<String>,
    /// Absolute directory for rolling log files.
    pub dir: Option<PathBuf>,
}

/// `[toggle]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToggleConfig {
    /// Kind given to days switched on by a single-day toggle.
    pub default_kind: VacationKind,
}

impl CoreConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Like [`Self::load`], but a missing file yields defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::model::vacation::VacationKind;
    use std::path::PathBuf;

    #[test]
    fn empty_source_yields_defaults() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.toggle.default_kind, VacationKind::Vacation);
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn partial_source_overrides_only_given_keys() {
        let config = CoreConfig::from_toml_str(
            r#"
            database_path = "/tmp/team.sqlite3"

            [toggle]
            default_kind = "personal"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/team.sqlite3"));
        assert_eq!(config.toggle.default_kind, VacationKind::Personal);
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn unknown_keys_and_kinds_are_rejected() {
        let typo = CoreConfig::from_toml_str("databse_path = \"x\"").unwrap_err();
        assert!(matches!(typo, ConfigError::Parse(_)));

        let kind = CoreConfig::from_toml_str("[toggle]\ndefault_kind = \"holiday\"").unwrap_err();
        assert!(matches!(kind, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_falls_back_only_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(
            CoreConfig::load(&path),
            Err(ConfigError::Io { .. })
        ));
        assert_eq!(CoreConfig::load_or_default(&path).unwrap(), CoreConfig::default());
    }
}
