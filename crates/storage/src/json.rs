// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON file-based storage

use knoa_core::{Storage, StorageError};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Pretty-printed JSON files under a root directory
#[derive(Debug, Clone)]
pub struct JsonStore {
    base_path: PathBuf,
}

impl JsonStore {
    /// Open a store at the given path, creating it if needed
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|source| io_error(&base_path, source))?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Remove a file; removing a missing file is a no-op
    pub fn delete(&self, dir: &str, name: &str) -> Result<(), StorageError> {
        let path = self.path_for(dir, name);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| io_error(&path, source))?;
        }
        Ok(())
    }

    /// Stems of the `.json` files in `dir`, sorted
    pub fn list(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let dir_path = self.dir_path(dir);
        if !dir_path.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let entries = fs::read_dir(&dir_path).map_err(|source| io_error(&dir_path, source))?;
        for entry in entries {
            let path = entry.map_err(|source| io_error(&dir_path, source))?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn dir_path(&self, dir: &str) -> PathBuf {
        if dir.is_empty() || dir == "." {
            self.base_path.clone()
        } else {
            self.base_path.join(dir)
        }
    }

    fn path_for(&self, dir: &str, name: &str) -> PathBuf {
        self.dir_path(dir).join(name)
    }
}

impl Storage for JsonStore {
    fn file_exists(&self, dir: &str, name: &str) -> bool {
        self.path_for(dir, name).is_file()
    }

    fn read_json(&self, dir: &str, name: &str) -> Result<Value, StorageError> {
        let path = self.path_for(dir, name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound {
                    dir: dir.to_string(),
                    name: name.to_string(),
                })
            }
            Err(source) => return Err(io_error(&path, source)),
        };
        serde_json::from_str(&content).map_err(|source| StorageError::Json { path, source })
    }

    fn write_json(&self, dir: &str, name: &str, value: &Value) -> Result<(), StorageError> {
        self.ensure_directory_exists(dir)?;
        let path = self.path_for(dir, name);
        let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| io_error(&path, source))?;
        tracing::trace!(path = %path.display(), "wrote json");
        Ok(())
    }

    fn ensure_directory_exists(&self, dir: &str) -> Result<(), StorageError> {
        let path = self.dir_path(dir);
        fs::create_dir_all(&path).map_err(|source| io_error(&path, source))
    }
}

fn io_error(path: &Path, source: io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
