// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage contract required by managers
//!
//! Locations are a namespace directory plus a file name, both relative to
//! the store root.

use crate::error::KnoaError;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("not found: {dir}/{name}")]
    NotFound { dir: String, name: String },
}

impl StorageError {
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::Io { .. } => "ERR_STORAGE_IO",
            StorageError::Json { .. } => "ERR_STORAGE_JSON",
            StorageError::NotFound { .. } => "ERR_STORAGE_NOT_FOUND",
        }
    }
}

/// Every storage failure surfaces as the `storage` kind
impl From<StorageError> for KnoaError {
    fn from(error: StorageError) -> Self {
        let mut converted = KnoaError::storage(error.to_string()).with_code(error.code());
        match &error {
            StorageError::Io { path, .. } | StorageError::Json { path, .. } => {
                converted = converted.with_context("path", path.display().to_string());
            }
            StorageError::NotFound { dir, name } => {
                converted = converted
                    .with_context("dir", dir.as_str())
                    .with_context("name", name.as_str());
            }
        }
        converted.with_cause(error)
    }
}

pub trait Storage: Send + Sync {
    fn file_exists(&self, dir: &str, name: &str) -> bool;

    /// Fails with [`StorageError::NotFound`] when the file is absent
    fn read_json(&self, dir: &str, name: &str) -> Result<Value, StorageError>;

    /// Creates `dir` when needed
    fn write_json(&self, dir: &str, name: &str, value: &Value) -> Result<(), StorageError>;

    fn ensure_directory_exists(&self, dir: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn not_found_maps_to_storage_kind_with_location() {
        let err: KnoaError = StorageError::NotFound {
            dir: "tasks".into(),
            name: "T001.json".into(),
        }
        .into();

        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.code(), "ERR_STORAGE_NOT_FOUND");
        assert!(err.is_recoverable());
        assert_eq!(err.context()["dir"], json!("tasks"));
        assert!(err.cause().is_some());
    }

    #[test]
    fn io_errors_keep_the_path() {
        let err: KnoaError = StorageError::Io {
            path: PathBuf::from("/tmp/x.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();

        assert_eq!(err.code(), "ERR_STORAGE_IO");
        assert_eq!(err.context()["path"], json!("/tmp/x.json"));
        assert!(err.message().contains("denied"));
    }
}
