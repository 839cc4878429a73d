// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::ErrorKind;
use serde_json::json;
use yare::parameterized;

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("params must be an object"),
    }
}

fn commit_schema() -> ParamSchema {
    ParamSchema::new()
        .required("taskId", Some(Check::task_id()))
        .required("commitHash", Some(Check::commit_hash()))
}

#[parameterized(
    task = { "T001", true },
    task_four_digits = { "T0001", false },
    lowercase = { "t001", false },
    word = { "bad-id", false },
)]
fn task_id_check(value: &str, ok: bool) {
    assert_eq!(Check::task_id().test(&json!(value)), ok);
}

#[parameterized(
    short_hash = { "abc1234", true },
    full_hash = { "0123456789abcdef0123456789abcdef01234567", true },
    too_short = { "abc123", false },
    slug = { "session-2026-01-01", true },
    bare_slug = { "session-", false },
    other = { "meeting-1", false },
)]
fn session_id_accepts_hash_or_slug(value: &str, ok: bool) {
    assert_eq!(Check::session_id().test(&json!(value)), ok);
}

#[test]
fn any_of_joins_expectations() {
    let check = Check::any_of(vec![Check::string(), Check::array()]);
    assert_eq!(check.expected(), "a string or an array");
    assert!(check.test(&json!([1])));
    assert!(!check.test(&json!(1)));
}

#[test]
fn bad_task_id_names_argument_and_format() {
    let err = commit_schema()
        .check(&params(json!({ "taskId": "bad-id", "commitHash": "abc1234" })))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.is_recoverable());
    assert_eq!(err.context()["argument"], json!("taskId"));
    assert_eq!(err.context()["value"], json!("bad-id"));
    assert!(err.message().contains("T001"));
}

#[test]
fn missing_and_null_required_params_are_rejected() {
    let schema = ParamSchema::new().required("title", Some(Check::non_empty_string()));

    for value in [json!({}), json!({ "title": null })] {
        let err = schema.check(&params(value)).unwrap_err();
        assert_eq!(err.message(), "Missing required parameter: title");
        assert_eq!(err.context()["argument"], json!("title"));
    }
}

#[test]
fn optional_params_are_checked_only_when_present() {
    let schema = ParamSchema::new().optional("status", Check::one_of(&["pending", "done"]));

    assert!(schema.check(&Map::new()).is_ok());
    assert!(schema.check(&params(json!({ "status": "done" }))).is_ok());
    let err = schema.check(&params(json!({ "status": "later" }))).unwrap_err();
    assert_eq!(err.context()["expected"], json!("one of pending, done"));
}

#[test]
fn report_collects_every_violation() {
    let schema = commit_schema().closed();

    let report = schema.validate(&json!({ "taskId": "x", "extra": 1 }));

    assert!(!report.is_valid);
    assert_eq!(
        report.errors,
        vec![
            "taskId must be a task id like T001 (T followed by three digits)",
            "commitHash is required",
        ]
    );
    assert_eq!(report.warnings, vec!["unexpected field extra"]);
}

#[test]
fn invalid_report_becomes_validation_error() {
    let report = ValidationReport {
        is_valid: false,
        errors: vec!["title is required".into()],
        warnings: vec!["unexpected field x".into()],
    };

    let err = report.into_error("task").unwrap();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.context()["errors"], json!(["title is required"]));
    assert_eq!(err.context()["warnings"], json!(["unexpected field x"]));
    assert!(ValidationReport::valid().into_error("task").is_none());
}

#[test]
fn report_serializes_camel_case() {
    let value = serde_json::to_value(ValidationReport::valid()).unwrap();
    assert_eq!(value, json!({ "isValid": true, "errors": [], "warnings": [] }));
}
