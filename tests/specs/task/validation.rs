//! Task validation specs
//!
//! Invalid arguments come back as validation envelopes and exit 2.

use crate::prelude::*;

#[test]
fn malformed_task_id_exits_two() {
    let temp = Project::empty();
    temp.knoa().args(&["task", "create", "first"]).passes();

    temp.knoa()
        .args(&["task", "commit", "bad-id", "abc1234"])
        .fails_with(2)
        .stderr_has("Invalid taskId")
        .stderr_has("-> argument: taskId");
}

#[test]
fn malformed_commit_hash_exits_two() {
    let temp = Project::empty();
    temp.knoa().args(&["task", "create", "first"]).passes();

    temp.knoa()
        .args(&["task", "commit", "T001", "xyz"])
        .fails_with(2)
        .stderr_has("Invalid commitHash");
}

#[test]
fn blank_title_exits_two() {
    let temp = Project::empty();

    temp.knoa()
        .args(&["task", "create", ""])
        .fails_with(2)
        .stderr_has("title");
}

#[test]
fn json_format_prints_the_envelope() {
    let temp = Project::empty();

    let run = temp
        .knoa()
        .args(&["task", "commit", "bad-id", "abc1234", "--format", "json"])
        .fails_with(2);

    let envelope = run.stdout_json();
    assert_eq!(envelope["error"], json!(true));
    assert_eq!(envelope["code"], json!("ERR_VALIDATION"));
    assert_eq!(envelope["operation"], json!("addGitCommitToTask"));
    assert_eq!(envelope["recoverable"], json!(true));
    assert_eq!(envelope["context"]["argument"], json!("taskId"));
}

#[test]
fn rejected_commands_write_nothing() {
    let temp = Project::empty();

    temp.knoa()
        .args(&["task", "create", ""])
        .fails_with(2);

    assert!(!temp.root().join("latest-tasks.json").exists());
}

#[test]
fn update_without_changes_is_refused() {
    let temp = Project::empty();

    temp.knoa()
        .args(&["task", "update", "T001"])
        .fails_with(1)
        .stderr_has("nothing to update");
}
