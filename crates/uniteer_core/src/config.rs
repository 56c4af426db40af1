//! Process configuration read from the environment.
//!
//! # Responsibility
//! - Collect log level, log directory and database location in one value.
//! - Normalize and validate raw values before any subsystem sees them.
//!
//! # Invariants
//! - Unset variables fall back to defaults; set-but-invalid values are errors.
//! - `log_dir` is always absolute when present.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_LOG_LEVEL: &str = "UNITEER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "UNITEER_LOG_DIR";
pub const ENV_DB_PATH: &str = "UNITEER_DB_PATH";

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Level is not one of trace|debug|info|warn|error.
    UnsupportedLogLevel(String),
    /// Log directory is not absolute.
    RelativeLogDir(String),
    /// Variable is set but blank.
    EmptyValue(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLogLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeLogDir(value) => {
                write!(f, "log_dir must be an absolute path, got `{value}`")
            }
            Self::EmptyValue(name) => write!(f, "{name} cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

/// Core runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub log_level: &'static str,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
    /// In-memory database when `None`.
    pub db_path: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: None,
            db_path: None,
        }
    }
}

impl CoreConfig {
    /// Reads `UNITEER_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level)?;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            config.log_dir = Some(normalize_log_dir(&dir)?);
        }
        if let Some(path) = lookup(ENV_DB_PATH) {
            let trimmed = path.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::EmptyValue(ENV_DB_PATH));
            }
            config.db_path = Some(PathBuf::from(trimmed));
        }
        Ok(config)
    }
}

/// Returns the default log level for current build mode.
///
/// - `debug` builds -> `debug`
/// - `release` builds -> `info`
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

pub fn normalize_level(level: &str) -> Result<&'static str, ConfigError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(ConfigError::UnsupportedLogLevel(other.to_string())),
    }
}

pub fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, ConfigError> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyValue("log_dir"));
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(ConfigError::RelativeLogDir(trimmed.to_string()));
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::{
        default_log_level, normalize_level, normalize_log_dir, ConfigError, CoreConfig,
        ENV_DB_PATH, ENV_LOG_LEVEL,
    };
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(matches!(
            normalize_level("loud"),
            Err(ConfigError::UnsupportedLogLevel(_))
        ));
    }

    #[test]
    fn normalize_log_dir_rejects_relative_path() {
        assert!(matches!(
            normalize_log_dir("logs/dev"),
            Err(ConfigError::RelativeLogDir(_))
        ));
    }

    #[test]
    fn unset_variables_use_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn set_variables_are_normalized() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (ENV_LOG_LEVEL, " Error "),
            (ENV_DB_PATH, " /tmp/uniteer.sqlite3 "),
        ]))
        .unwrap();
        assert_eq!(config.log_level, "error");
        assert_eq!(
            config.db_path.as_deref(),
            Some(std::path::Path::new("/tmp/uniteer.sqlite3"))
        );

        let blank = CoreConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "  ")]));
        assert_eq!(blank, Err(ConfigError::EmptyValue(ENV_DB_PATH)));
    }
}
