// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory storage

use knoa_core::{Storage, StorageError};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

#[derive(Default)]
struct Files {
    dirs: BTreeSet<String>,
    files: BTreeMap<(String, String), Value>,
}

/// Storage backed by a map; nothing touches the filesystem
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<Files>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names stored under `dir`, sorted
    pub fn names(&self, dir: &str) -> Vec<String> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .files
            .keys()
            .filter(|(d, _)| d == dir)
            .map(|(_, name)| name.clone())
            .collect()
    }

    pub fn has_directory(&self, dir: &str) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.dirs.contains(dir)
    }
}

impl Storage for MemoryStorage {
    fn file_exists(&self, dir: &str, name: &str) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.files.contains_key(&(dir.to_string(), name.to_string()))
    }

    fn read_json(&self, dir: &str, name: &str) -> Result<Value, StorageError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .files
            .get(&(dir.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                dir: dir.to_string(),
                name: name.to_string(),
            })
    }

    fn write_json(&self, dir: &str, name: &str, value: &Value) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.dirs.insert(dir.to_string());
        inner
            .files
            .insert((dir.to_string(), name.to_string()), value.clone());
        Ok(())
    }

    fn ensure_directory_exists(&self, dir: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.dirs.insert(dir.to_string());
        Ok(())
    }
}
