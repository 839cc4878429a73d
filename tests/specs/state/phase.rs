//! Project state specs

use crate::prelude::*;

#[test]
fn fresh_project_is_planning() {
    let temp = Project::empty();

    temp.knoa()
        .args(&["state", "show"])
        .passes()
        .stdout_has("Phase: planning");
}

#[test]
fn phase_change_persists_with_history() {
    let temp = Project::empty();
    temp.knoa()
        .args(&["state", "phase", "implementation"])
        .passes()
        .stdout_has("Phase: implementation");

    temp.knoa()
        .args(&["state", "show"])
        .passes()
        .stdout_has("Phase: implementation")
        .stdout_has("Updated:");

    let history = std::fs::read_dir(temp.root().join("state-history"))
        .unwrap()
        .count();
    assert_eq!(history, 1);
}

#[test]
fn blank_phase_exits_two() {
    let temp = Project::empty();

    temp.knoa()
        .args(&["state", "phase", ""])
        .fails_with(2)
        .stderr_has("phase");
}

#[test]
fn phase_change_is_traced_without_alias() {
    let temp = Project::empty();

    let run = temp
        .knoa()
        .args(&["--trace", "state", "phase", "review"])
        .passes();

    let names: Vec<String> = run
        .stderr()
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter_map(|v| v["event"].as_str().map(str::to_string))
        .collect();
    assert_eq!(names, vec!["state:phase_changed", "event"]);
}
