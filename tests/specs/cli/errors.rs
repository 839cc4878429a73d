//! CLI error specs
//!
//! Verify exit codes and rendering of failure envelopes.

use crate::prelude::*;

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let temp = Project::empty();

    temp.knoa()
        .args(&["frobnicate"])
        .fails_with(2)
        .stderr_has("unrecognized subcommand");
}

#[test]
fn malformed_config_fails_before_any_command() {
    let temp = Project::empty();
    temp.file(".knoa/knoa.toml", "recovery_attempts = 0\n");

    temp.knoa()
        .args(&["task", "list"])
        .fails_with(1)
        .stderr_has("recovery_attempts");
}

#[test]
fn corrupt_snapshot_reports_a_storage_failure() {
    let temp = Project::empty();
    temp.file(".knoa/latest-tasks.json", "{ not json");

    temp.knoa()
        .args(&["task", "list"])
        .fails_with(1)
        .stderr_has("suggestions:")
        .stderr_has("--root directory is writable");
}
