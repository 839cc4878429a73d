//! `--trace` specs
//!
//! Every emission is echoed to stderr as one JSON line.

use crate::prelude::*;

fn traced_names(stderr: &str) -> Vec<String> {
    stderr
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter_map(|v| v["event"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn create_traces_canonical_global_and_alias() {
    let temp = Project::empty();

    let run = temp
        .knoa()
        .args(&["--trace", "task", "create", "write docs"])
        .passes();

    assert_eq!(
        traced_names(&run.stderr()),
        vec!["task:task_created", "event", "task:created"]
    );
}

#[test]
fn validation_failure_traces_only_the_error() {
    let temp = Project::empty();

    let run = temp
        .knoa()
        .args(&["--trace", "task", "commit", "bad-id", "abc1234"])
        .fails_with(2);

    assert_eq!(traced_names(&run.stderr()), vec!["error:occurred", "event"]);
}

#[test]
fn traced_payloads_share_one_trace_id() {
    let temp = Project::empty();

    let run = temp
        .knoa()
        .args(&["--trace", "task", "create", "write docs"])
        .passes();

    let payloads: Vec<Value> = run
        .stderr()
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .map(|v| v["payload"].clone())
        .collect();
    assert_eq!(payloads.len(), 3);
    let trace = payloads[0]["traceId"].clone();
    assert!(payloads.iter().all(|p| p["traceId"] == trace));
}
