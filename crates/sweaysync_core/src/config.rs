//! Runtime configuration for the application entry point.
//!
//! # Responsibility
//! - Resolve database, logging and health-export settings from the
//!   environment.
//! - Validate values with the same rules logging bootstrap applies.
//!
//! # Invariants
//! - Missing variables fall back to defaults; present-but-invalid values are
//!   errors.
//! - `log_dir`, when set, is absolute.

use crate::logging::{default_log_level, init_logging, normalize_level, normalize_log_dir};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "SWEAYSYNC_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "SWEAYSYNC_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SWEAYSYNC_LOG_DIR";
pub const ENV_HEALTH_EXPORT: &str = "SWEAYSYNC_HEALTH_EXPORT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    InvalidLogDir(String),
    EmptyPath(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{ENV_LOG_LEVEL}: {message}"),
            Self::InvalidLogDir(message) => write!(f, "{ENV_LOG_DIR}: {message}"),
            Self::EmptyPath(variable) => write!(f, "{variable} is set but empty"),
        }
    }
}

impl Error for ConfigError {}

/// Settings the entry point needs to build a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// `None` selects an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: &'static str,
    /// `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
    /// `None` selects the no-op health sink.
    pub health_export_path: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level(),
            log_dir: None,
            health_export_path: None,
        }
    }
}

impl CoreConfig {
    /// Reads `SWEAYSYNC_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            config.log_dir = Some(normalize_log_dir(&dir).map_err(ConfigError::InvalidLogDir)?);
        }
        config.db_path = optional_path(&lookup, ENV_DB_PATH)?;
        config.health_export_path = optional_path(&lookup, ENV_HEALTH_EXPORT)?;

        Ok(config)
    }

    /// Starts file logging when `log_dir` is set.
    ///
    /// Returns `Ok(false)` when logging stays off.
    ///
    /// # Errors
    /// - `log_dir` is not valid UTF-8; the path is never rewritten lossily.
    /// - Logger bootstrap failed or conflicts with an active config.
    pub fn start_logging(&self) -> Result<bool, String> {
        let Some(log_dir) = self.log_dir.as_ref() else {
            return Ok(false);
        };
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("{ENV_LOG_DIR}: `{}` is not valid UTF-8", log_dir.display()))?;
        init_logging(self.log_level, log_dir)?;
        Ok(true)
    }
}

fn optional_path<F>(lookup: &F, variable: &'static str) -> Result<Option<PathBuf>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(variable) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyPath(variable)),
        Some(value) => Ok(Some(PathBuf::from(value.trim()))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.log_level, default_log_level());
        assert!(config.db_path.is_none());
    }

    #[test]
    fn values_are_normalized() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (ENV_LOG_LEVEL, " Warning "),
            (ENV_LOG_DIR, "/var/log/sweaysync"),
            (ENV_DB_PATH, " /data/sweaysync.sqlite3 "),
        ]))
        .unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/sweaysync")));
        assert_eq!(
            config.db_path,
            Some(PathBuf::from("/data/sweaysync.sqlite3"))
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let level = CoreConfig::from_lookup(lookup_from(&[(ENV_LOG_LEVEL, "loud")])).unwrap_err();
        assert!(matches!(level, ConfigError::InvalidLogLevel(_)));

        let dir = CoreConfig::from_lookup(lookup_from(&[(ENV_LOG_DIR, "logs")])).unwrap_err();
        assert!(matches!(dir, ConfigError::InvalidLogDir(_)));

        let db = CoreConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "  ")])).unwrap_err();
        assert_eq!(db, ConfigError::EmptyPath(ENV_DB_PATH));
    }

    #[test]
    fn start_logging_is_a_no_op_without_log_dir() {
        assert_eq!(CoreConfig::default().start_logging(), Ok(false));
    }

    #[cfg(unix)]
    #[test]
    fn start_logging_rejects_non_utf8_log_dir() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let config = CoreConfig {
            log_dir: Some(PathBuf::from(OsStr::from_bytes(b"/tmp/sweaysync-\xff-logs"))),
            ..CoreConfig::default()
        };
        let err = config.start_logging().unwrap_err();
        assert!(err.contains("not valid UTF-8"), "unexpected error: {err}");
    }
}
