//! Application configuration.
//!
//! # Responsibility
//! - Load and save the JSON configuration file.
//! - Build the immutable template registry from configured paths.
//!
//! # Invariants
//! - Missing keys fall back to defaults; unknown keys are rejected.

use crate::export::template::TemplateRegistry;
use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data").join("epr.db")
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("public").join("assets")
}

/// Runtime configuration shared by the CLI and embedding callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory holding the template PDF assets.
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// One of `trace|debug|info|warn|error`; unset means the build-mode default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; file logging is off when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            template_dir: default_template_dir(),
            log_level: None,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Saves config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content).map_err(io_error)
    }

    /// Configured log level, or the build-mode default when unset.
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or_else(|| default_log_level())
    }

    /// Builds the built-in template registry rooted at `template_dir`.
    pub fn template_registry(&self) -> TemplateRegistry {
        TemplateRegistry::builtin(&self.template_dir)
    }
}
