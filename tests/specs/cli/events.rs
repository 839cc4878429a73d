//! `knoa events` specs

use crate::prelude::*;

#[test]
fn lists_canonical_names_with_legacy_aliases() {
    let temp = Project::empty();

    temp.knoa()
        .args(&["events"])
        .passes()
        .stdout_has("task:task_created")
        .stdout_has("(legacy: task:created)")
        .stdout_has("error:alert_triggered");
}

#[test]
fn json_catalogue_is_sorted_by_name() {
    let temp = Project::empty();

    let run = temp.knoa().args(&["events", "--format", "json"]).passes();
    let catalogue = run.stdout_json();

    let names: Vec<&str> = catalogue
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq_diff!(names, sorted);
    let created = catalogue
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["name"] == json!("task:task_created"))
        .unwrap();
    assert_eq!(created["aliases"], json!(["task:created"]));
}
