// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by managers, adapters and the error handler
//!
//! Every failure that crosses an adapter boundary is a [`KnoaError`] tagged
//! with one [`ErrorKind`]. Kinds carry a canonical `ERR_<DOMAIN>` code and a
//! default recoverability; individual errors may override both.

use crate::clock::iso8601;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// The closed set of error classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    State,
    DataConsistency,
    Storage,
    Network,
    Timeout,
    Configuration,
    Dependency,
    NotFound,
    Cli,
    LockTimeout,
    Application,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 12] = [
        ErrorKind::Validation,
        ErrorKind::State,
        ErrorKind::DataConsistency,
        ErrorKind::Storage,
        ErrorKind::Network,
        ErrorKind::Timeout,
        ErrorKind::Configuration,
        ErrorKind::Dependency,
        ErrorKind::NotFound,
        ErrorKind::Cli,
        ErrorKind::LockTimeout,
        ErrorKind::Application,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::State => "state",
            ErrorKind::DataConsistency => "data_consistency",
            ErrorKind::Storage => "storage",
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Dependency => "dependency",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Cli => "cli",
            ErrorKind::LockTimeout => "lock_timeout",
            ErrorKind::Application => "application",
        }
    }

    /// Name used in the structured form (`ValidationError`, ...)
    pub fn error_name(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::State => "StateError",
            ErrorKind::DataConsistency => "DataConsistencyError",
            ErrorKind::Storage => "StorageError",
            ErrorKind::Network => "NetworkError",
            ErrorKind::Timeout => "TimeoutError",
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::Dependency => "DependencyError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Cli => "CliError",
            ErrorKind::LockTimeout => "LockTimeoutError",
            ErrorKind::Application => "ApplicationError",
        }
    }

    pub fn canonical_code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ERR_VALIDATION",
            ErrorKind::State => "ERR_STATE",
            ErrorKind::DataConsistency => "ERR_DATA_CONSISTENCY",
            ErrorKind::Storage => "ERR_STORAGE",
            ErrorKind::Network => "ERR_NETWORK",
            ErrorKind::Timeout => "ERR_TIMEOUT",
            ErrorKind::Configuration => "ERR_CONFIGURATION",
            ErrorKind::Dependency => "ERR_DEPENDENCY",
            ErrorKind::NotFound => "ERR_NOT_FOUND",
            ErrorKind::Cli => "ERR_CLI",
            ErrorKind::LockTimeout => "ERR_LOCK_TIMEOUT",
            ErrorKind::Application => "ERR_APPLICATION",
        }
    }

    pub fn default_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Validation
                | ErrorKind::Storage
                | ErrorKind::Network
                | ErrorKind::Timeout
                | ErrorKind::Dependency
                | ErrorKind::LockTimeout
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown error kind: {0}")]
pub struct UnknownErrorKind(pub String);

impl FromStr for ErrorKind {
    type Err = UnknownErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownErrorKind(s.to_string()))
    }
}

type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// A classified failure with structured context
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct KnoaError {
    kind: ErrorKind,
    message: String,
    code: String,
    recoverable: bool,
    context: Map<String, Value>,
    #[source]
    cause: Option<Cause>,
    timestamp: Option<DateTime<Utc>>,
}

impl KnoaError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: kind.canonical_code().to_string(),
            recoverable: kind.default_recoverable(),
            context: Map::new(),
            cause: None,
            timestamp: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::State, message)
    }

    pub fn data_consistency(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataConsistency, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn dependency(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Dependency, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn cli(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cli, message)
    }

    pub fn lock_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LockTimeout, message)
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Application, message)
    }

    /// Wrap any foreign error as `application`, keeping it as the cause
    pub fn from_foreign<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::application(error.to_string()).with_cause(error)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_recoverable(mut self, recoverable: bool) -> Self {
        self.recoverable = recoverable;
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_recoverable(&self) -> bool {
        self.recoverable
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Add fields the error does not already carry; the first timestamp sticks
    pub(crate) fn enrich(&mut self, fields: Map<String, Value>, timestamp: DateTime<Utc>) {
        for (key, value) in fields {
            self.context.entry(key).or_insert(value);
        }
        self.timestamp.get_or_insert(timestamp);
    }

    /// `{ name, message, code, recoverable, context, cause?, timestamp }`
    pub fn to_structured(&self) -> StructuredError {
        StructuredError {
            name: self.kind.error_name().to_string(),
            kind: self.kind,
            message: self.message.clone(),
            code: self.code.clone(),
            recoverable: self.recoverable,
            context: self.context.clone(),
            cause: self.cause.as_ref().map(|c| c.to_string()),
            timestamp: self.timestamp.as_ref().map(iso8601),
        }
    }

    /// The uniform value returned to callers instead of the error
    pub fn to_envelope(&self, operation: &str) -> ErrorEnvelope {
        ErrorEnvelope {
            error: true,
            message: self.message.clone(),
            code: self.code.clone(),
            operation: operation.to_string(),
            timestamp: self
                .timestamp
                .as_ref()
                .map(iso8601)
                .unwrap_or_else(|| iso8601(&Utc::now())),
            recoverable: self.recoverable,
            context: self.context.clone(),
        }
    }
}

/// Serializable view of a [`KnoaError`] used in events and log lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredError {
    pub name: String,
    pub kind: ErrorKind,
    pub message: String,
    pub code: String,
    pub recoverable: bool,
    pub context: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// `{ error: true, message, code, operation, timestamp, recoverable, context }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: bool,
    pub message: String,
    pub code: String,
    pub operation: String,
    pub timestamp: String,
    pub recoverable: bool,
    pub context: Map<String, Value>,
}

impl ErrorEnvelope {
    /// Kind recovered from the code prefix, if it names one
    pub fn kind(&self) -> Option<ErrorKind> {
        ErrorKind::ALL
            .iter()
            .copied()
            .filter(|k| self.code.starts_with(k.canonical_code()))
            .max_by_key(|k| k.canonical_code().len())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
