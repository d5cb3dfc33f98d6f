//! Core runtime configuration.
//!
//! Resolved once at startup and passed into services, so nothing reads process-wide
//! environment variables while a session is being edited.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable naming the SQLite database file.
pub const DATABASE_PATH_ENV: &str = "PET_SERIES_DB_PATH";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidInput(String),

    #[error("environment variable {name} is not valid unicode")]
    NotUnicode { name: &'static str },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Core configuration resolved at startup.
#[derive(Clone, Debug, Default)]
pub struct CoreConfig {
    database_path: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`. `None` keeps records in memory.
    pub fn new(database_path: Option<PathBuf>) -> ConfigResult<Self> {
        if let Some(path) = &database_path {
            validate_database_path(path)?;
        }
        Ok(Self { database_path })
    }

    /// Read [`DATABASE_PATH_ENV`] once. Unset means in-memory.
    pub fn from_env() -> ConfigResult<Self> {
        match std::env::var(DATABASE_PATH_ENV) {
            Ok(value) => Self::from_env_value(&value),
            Err(std::env::VarError::NotPresent) => Self::new(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode {
                name: DATABASE_PATH_ENV,
            }),
        }
    }

    fn from_env_value(value: &str) -> ConfigResult<Self> {
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidInput(format!(
                "{} is set but empty",
                DATABASE_PATH_ENV
            )));
        }
        Self::new(Some(PathBuf::from(value.trim())))
    }

    pub fn database_path(&self) -> Option<&Path> {
        self.database_path.as_deref()
    }
}

fn validate_database_path(path: &Path) -> ConfigResult<()> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidInput("database path cannot be empty".into()));
    }
    if path.is_dir() {
        return Err(ConfigError::InvalidInput(format!(
            "database path is a directory: {}",
            path.display()
        )));
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(ConfigError::InvalidInput(format!(
                "database directory does not exist: {}",
                parent.display()
            )))
        }
        _ => Ok(()),
    }
}
