// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn store() -> (tempfile::TempDir, JsonStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path().join("data")).unwrap();
    (dir, store)
}

#[test]
fn write_then_read() {
    let (_dir, store) = store();
    let value = json!({ "id": "T001", "title": "write spec" });

    store.write_json("tasks", "T001.json", &value).unwrap();

    assert!(store.file_exists("tasks", "T001.json"));
    assert_eq!(store.read_json("tasks", "T001.json").unwrap(), value);
}

#[test]
fn files_are_pretty_printed() {
    let (_dir, store) = store();
    store.write_json("", "latest-state.json", &json!({ "phase": "build" })).unwrap();

    let raw = std::fs::read_to_string(store.base_path().join("latest-state.json")).unwrap();
    assert_eq!(raw, "{\n  \"phase\": \"build\"\n}");
}

#[test]
fn missing_file_is_not_found() {
    let (_dir, store) = store();

    assert!(!store.file_exists("tasks", "T404.json"));
    assert!(matches!(
        store.read_json("tasks", "T404.json"),
        Err(StorageError::NotFound { .. })
    ));
}

#[test]
fn corrupt_file_is_a_json_error() {
    let (_dir, store) = store();
    store.ensure_directory_exists("tasks").unwrap();
    std::fs::write(store.base_path().join("tasks/T001.json"), "{ not json").unwrap();

    assert!(matches!(
        store.read_json("tasks", "T001.json"),
        Err(StorageError::Json { .. })
    ));
}

#[test]
fn list_returns_sorted_stems() {
    let (_dir, store) = store();
    for id in ["T003", "T001", "T002"] {
        store.write_json("tasks", &format!("{id}.json"), &json!({})).unwrap();
    }
    std::fs::write(store.base_path().join("tasks/notes.txt"), "skip").unwrap();

    assert_eq!(store.list("tasks").unwrap(), vec!["T001", "T002", "T003"]);
    assert!(store.list("sessions").unwrap().is_empty());
}

#[test]
fn delete_removes_file_and_tolerates_missing() {
    let (_dir, store) = store();
    store.write_json("tasks", "T001.json", &json!({})).unwrap();

    store.delete("tasks", "T001.json").unwrap();
    store.delete("tasks", "T001.json").unwrap();

    assert!(!store.file_exists("tasks", "T001.json"));
}
