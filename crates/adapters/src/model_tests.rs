// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use knoa_core::ErrorKind;
use serde_json::json;
use yare::parameterized;

#[test]
fn new_task_serializes_only_populated_fields() {
    let task = Task::new("T001", "write spec");
    assert_eq!(
        serde_json::to_value(&task).unwrap(),
        json!({ "id": "T001", "title": "write spec", "status": "pending" })
    );
}

#[test]
fn apply_reports_changes() {
    let mut task = Task::new("T001", "write spec");

    assert!(!task.apply(&TaskChanges::default()));
    assert!(task.apply(&TaskChanges {
        status: Some(TaskStatus::InProgress),
        ..TaskChanges::default()
    }));
    assert_eq!(task.status, TaskStatus::InProgress);
}

#[test]
fn commits_are_linked_once() {
    let mut task = Task::new("T001", "x");
    assert!(task.link_commit("abc1234"));
    assert!(!task.link_commit("abc1234"));
    assert_eq!(task.commits, vec!["abc1234"]);
}

#[parameterized(
    pending = { "pending", FeedbackStatus::Pending },
    in_progress = { "in_progress", FeedbackStatus::InProgress },
    resolved = { "resolved", FeedbackStatus::Resolved },
    dismissed = { "dismissed", FeedbackStatus::Dismissed },
)]
fn feedback_status_names(name: &str, status: FeedbackStatus) {
    assert_eq!(name.parse::<FeedbackStatus>().unwrap(), status);
    assert_eq!(status.to_string(), name);
    assert!(FeedbackStatus::NAMES.contains(&name));
}

#[test]
fn unknown_feedback_status_is_validation_error() {
    let err = "later".parse::<FeedbackStatus>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn state_merge_routes_known_and_extra_keys() {
    let mut state = ProjectState::default();
    let changes = json!({ "phase": "review", "currentTask": "T002", "notes": "ship it" });

    state.merge(changes.as_object().unwrap()).unwrap();

    assert_eq!(state.phase, "review");
    assert_eq!(state.current_task.as_deref(), Some("T002"));
    assert_eq!(
        serde_json::to_value(&state).unwrap(),
        json!({ "phase": "review", "currentTask": "T002", "notes": "ship it" })
    );
}

#[test]
fn state_merge_rejects_non_string_phase() {
    let mut state = ProjectState::default();
    let err = state
        .merge(json!({ "phase": 3 }).as_object().unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
}

#[test]
fn filter_by_status() {
    let task = Task::new("T001", "x");
    assert!(TaskFilter::default().matches(&task));
    assert!(!TaskFilter {
        status: Some(TaskStatus::Completed)
    }
    .matches(&task));
}

proptest::proptest! {
    #[test]
    fn linked_commits_stay_unique(hashes in proptest::collection::vec("[0-9a-f]{7}", 0..20)) {
        let mut task = Task::new("T001", "x");
        for hash in &hashes {
            task.link_commit(hash);
        }
        let mut unique = hashes.clone();
        unique.sort();
        unique.dedup();
        let mut linked = task.commits.clone();
        linked.sort();
        proptest::prop_assert_eq!(linked, unique);
    }
}
