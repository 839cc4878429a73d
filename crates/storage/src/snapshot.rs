// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Latest/history snapshot layout
//!
//! ```text
//! <root>/latest-<entity>.json
//! <root>/<entity>-history/<entity>-<id>.json
//! ```

use knoa_core::{Storage, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct SnapshotStore {
    storage: Arc<dyn Storage>,
}

impl SnapshotStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn save_latest<T: Serialize>(&self, entity: &str, value: &T) -> Result<(), StorageError> {
        let name = latest_name(entity);
        self.write("", &name, value)
    }

    /// `None` when no snapshot has been written yet
    pub fn load_latest<T: DeserializeOwned>(&self, entity: &str) -> Result<Option<T>, StorageError> {
        let name = latest_name(entity);
        self.read("", &name)
    }

    pub fn save_history<T: Serialize>(
        &self,
        entity: &str,
        id: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        self.write(&history_dir(entity), &history_name(entity, id), value)
    }

    pub fn load_history<T: DeserializeOwned>(
        &self,
        entity: &str,
        id: &str,
    ) -> Result<Option<T>, StorageError> {
        self.read(&history_dir(entity), &history_name(entity, id))
    }

    /// Write `value` as both the latest snapshot and history entry `id`
    pub fn record<T: Serialize>(&self, entity: &str, id: &str, value: &T) -> Result<(), StorageError> {
        self.save_history(entity, id, value)?;
        self.save_latest(entity, value)
    }

    fn write<T: Serialize>(&self, dir: &str, name: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value).map_err(|source| StorageError::Json {
            path: location(dir, name),
            source,
        })?;
        self.storage.write_json(dir, name, &value)
    }

    fn read<T: DeserializeOwned>(&self, dir: &str, name: &str) -> Result<Option<T>, StorageError> {
        if !self.storage.file_exists(dir, name) {
            return Ok(None);
        }
        let value = self.storage.read_json(dir, name)?;
        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StorageError::Json {
                path: location(dir, name),
                source,
            })
    }
}

fn latest_name(entity: &str) -> String {
    format!("latest-{entity}.json")
}

fn history_dir(entity: &str) -> String {
    format!("{entity}-history")
}

fn history_name(entity: &str, id: &str) -> String {
    format!("{entity}-{id}.json")
}

fn location(dir: &str, name: &str) -> PathBuf {
    PathBuf::from(dir).join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct State {
        phase: String,
    }

    fn store() -> (Arc<MemoryStorage>, SnapshotStore) {
        let memory = Arc::new(MemoryStorage::new());
        let store = SnapshotStore::new(Arc::clone(&memory) as Arc<dyn Storage>);
        (memory, store)
    }

    #[test]
    fn latest_round_trips_and_starts_empty() {
        let (_, store) = store();
        assert_eq!(store.load_latest::<State>("state").unwrap(), None);

        store.save_latest("state", &State { phase: "build".into() }).unwrap();

        assert_eq!(
            store.load_latest::<State>("state").unwrap(),
            Some(State { phase: "build".into() })
        );
    }

    #[test]
    fn record_writes_latest_and_history_layout() {
        let (memory, store) = store();

        store.record("session", "abc1234", &State { phase: "review".into() }).unwrap();

        assert!(memory.file_exists("", "latest-session.json"));
        assert!(memory.file_exists("session-history", "session-abc1234.json"));
        assert_eq!(
            store.load_history::<State>("session", "abc1234").unwrap(),
            Some(State { phase: "review".into() })
        );
    }

    #[test]
    fn shape_mismatch_is_a_json_error() {
        let (memory, store) = store();
        memory
            .write_json("", "latest-state.json", &serde_json::json!([1, 2]))
            .unwrap();

        assert!(matches!(
            store.load_latest::<State>("state"),
            Err(StorageError::Json { .. })
        ));
    }
}
