//! Task lifecycle specs
//!
//! Create, list, show, update and link commits through the CLI.

use crate::prelude::*;

#[test]
fn create_prints_the_new_task() {
    let temp = Project::empty();

    temp.knoa()
        .args(&["task", "create", "write docs"])
        .passes()
        .stdout_has("T001")
        .stdout_has("pending")
        .stdout_has("write docs");
}

#[test]
fn tasks_persist_between_invocations() {
    let temp = Project::empty();
    temp.knoa().args(&["task", "create", "first"]).passes();
    temp.knoa().args(&["task", "create", "second"]).passes();

    let run = temp
        .knoa()
        .args(&["task", "list", "--format", "json"])
        .passes();

    let ids: Vec<Value> = run
        .stdout_json()
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].clone())
        .collect();
    assert_eq!(ids, vec![json!("T001"), json!("T002")]);
    assert!(temp.root().join("task-history/task-T002.json").is_file());
}

#[test]
fn empty_list_says_so() {
    let temp = Project::empty();

    temp.knoa()
        .args(&["task", "list"])
        .passes()
        .stdout_has("No tasks");
}

#[test]
fn update_then_filter_by_status() {
    let temp = Project::empty();
    temp.knoa().args(&["task", "create", "first"]).passes();
    temp.knoa().args(&["task", "create", "second"]).passes();
    temp.knoa()
        .args(&["task", "update", "T002", "--status", "in-progress"])
        .passes()
        .stdout_has("in_progress");

    let run = temp
        .knoa()
        .args(&["task", "list", "--status", "in-progress", "--format", "json"])
        .passes();

    let tasks = run.stdout_json();
    assert_eq!(tasks.as_array().map(Vec::len), Some(1));
    assert_eq!(tasks[0]["id"], json!("T002"));
}

#[test]
fn commit_is_linked_once() {
    let temp = Project::empty();
    temp.knoa().args(&["task", "create", "first"]).passes();
    temp.knoa()
        .args(&["task", "commit", "T001", "abc1234"])
        .passes();
    temp.knoa()
        .args(&["task", "commit", "T001", "abc1234"])
        .passes()
        .stdout_has("[abc1234]");

    let latest = temp.read_json(".knoa/latest-tasks.json");
    assert_eq!(latest[0]["commits"], json!(["abc1234"]));
}

#[test]
fn show_missing_task_fails() {
    let temp = Project::empty();

    temp.knoa()
        .args(&["task", "show", "T404"])
        .fails_with(1)
        .stderr_has("Task T404 not found");
}

#[test]
fn json_show_matches_stored_task() {
    let temp = Project::empty();
    temp.knoa()
        .args(&["task", "create", "first", "--description", "details"])
        .passes();

    let run = temp
        .knoa()
        .args(&["task", "show", "T001", "--format", "json"])
        .passes();

    let latest = temp.read_json(".knoa/latest-tasks.json");
    assert_eq_diff!(run.stdout_json(), latest[0]);
}
