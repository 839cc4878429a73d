// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core configuration
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! log_level = "debug"
//! deprecation_warnings = true
//! recovery_attempts = 3
//!
//! [history]
//! enabled = true
//! limit = 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            // tracing has no level above error
            LogLevel::Error | LogLevel::Fatal => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            limit: 100,
        }
    }
}

/// Whether the error handler runs only the first matching pattern or all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternMode {
    First,
    #[default]
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub log_level: LogLevel,
    pub history: HistoryConfig,
    /// Log a warning the first time each legacy alias is emitted
    pub deprecation_warnings: bool,
    /// Attempts a recovery strategy gets while it keeps failing recoverably
    pub recovery_attempts: u32,
    /// Size of the recent-errors window kept in statistics
    pub recent_errors_limit: usize,
    pub pattern_mode: PatternMode,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            history: HistoryConfig::default(),
            deprecation_warnings: true,
            recovery_attempts: 3,
            recent_errors_limit: 50,
            pattern_mode: PatternMode::default(),
        }
    }
}

impl CoreConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.limit == 0 {
            return Err(ConfigError::Invalid {
                key: "history.limit",
                reason: "must be a positive integer".into(),
            });
        }
        if self.recovery_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "recovery_attempts",
                reason: "must be a positive integer".into(),
            });
        }
        Ok(())
    }
}

impl From<ConfigError> for crate::error::KnoaError {
    fn from(error: ConfigError) -> Self {
        crate::error::KnoaError::configuration(error.to_string()).with_cause(error)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
