// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Integration tests for a fully wired `Core`.
//!
//! Drives the bus, error handler, registry and shim together through the
//! public API only.

use knoa_core::{
    AlertThreshold, Core, CoreConfig, CorrelationIds, ErrorKind, ErrorPattern, FakeClock,
    KnoaError, OperationContext, RecoveryKey, RecoveryStrategy, Resolution, Severity,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn core(toml: &str) -> Core {
    Core::builder(CoreConfig::from_toml_str(toml).unwrap())
        .clock(Arc::new(FakeClock::new()))
        .ids(CorrelationIds::sequential())
        .build()
}

fn record(core: &Core, pattern: &str) -> Arc<Mutex<Vec<(String, Value)>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    core.bus().subscribe(pattern, move |payload, name| {
        sink.lock().unwrap().push((name.to_string(), payload.clone()));
        Ok(())
    });
    seen
}

// =============================================================================
// Error pipeline
// =============================================================================

#[test]
fn alerting_and_recovery_share_one_pipeline() {
    let core = core("pattern_mode = \"first\"\n");
    let seen = record(&core, "error:*");
    let matched = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&matched);
    let handler = core.error_handler();

    handler.register_error_pattern(ErrorPattern::new(
        "storage-burst",
        |error, _| error.kind() == ErrorKind::Storage,
        move |error, ctx| {
            sink.lock()
                .unwrap()
                .push(format!("{}@{}", error.code(), ctx.request_id()));
            Ok(())
        },
    ));
    handler.register_alert_threshold(AlertThreshold::new(
        "storage-twice",
        |stats, _| stats.count_for_kind(ErrorKind::Storage) >= 2,
        Severity::High,
        "storage failed at least twice",
    ));
    handler.register_recovery_strategy(
        RecoveryKey::Kind(ErrorKind::Storage),
        RecoveryStrategy::new(|req| Ok(json!({ "fallback": req.operation }))),
    );

    let first = handler.handle(KnoaError::storage("disk busy"), "task", "createTask", None);
    let second = handler.handle(KnoaError::storage("disk busy"), "task", "createTask", None);

    assert_eq!(
        first.into_result().unwrap(),
        json!({ "fallback": "createTask" })
    );
    assert!(second.is_recovered());
    assert_eq!(matched.lock().unwrap().len(), 2);

    let names: Vec<String> = seen.lock().unwrap().iter().map(|(n, _)| n.clone()).collect();
    assert_eq!(
        names,
        vec!["error:occurred", "error:occurred", "error:alert_triggered"]
    );
    let alert = seen.lock().unwrap()[2].1.clone();
    assert_eq!(alert["severity"], json!("high"));
    assert_eq!(alert["threshold"], json!("storage-twice"));

    let dashboard = serde_json::to_value(handler.dashboard_data()).unwrap();
    assert_eq!(dashboard["statistics"]["total_errors"], json!(2));
    assert_eq!(dashboard["patterns"], json!(["storage-burst"]));
}

#[test]
fn non_recoverable_errors_stay_unresolved() {
    let core = core("");
    core.error_handler().register_recovery_strategy(
        RecoveryKey::Kind(ErrorKind::State),
        RecoveryStrategy::new(|_| Ok(json!("never used"))),
    );

    let resolution = core
        .error_handler()
        .handle(KnoaError::state("phase locked"), "state", "setPhase", None);

    match resolution {
        Resolution::Unresolved(error) => {
            assert_eq!(error.kind(), ErrorKind::State);
            assert_eq!(error.context()["component"], json!("state"));
        }
        other => panic!("expected unresolved, got {other:?}"),
    }
}

// =============================================================================
// Events, history and aliases
// =============================================================================

#[test]
fn history_records_canonical_global_and_alias_emissions() {
    let core = core("[history]\nenabled = true\nlimit = 3\n");
    let bus = core.bus();

    let envelope = bus.emit_standardized("task", "task_created", serde_json::Map::new());
    let aliases = core.shim().publish_aliases(bus, &envelope);
    bus.emit("task:task_updated", json!({}));

    assert_eq!(aliases, vec!["task:created"]);
    let history: Vec<String> = bus.history().iter().map(|h| h.event.clone()).collect();
    assert_eq!(history, vec!["event", "task:created", "task:task_updated"]);
}

#[test]
fn alias_payload_is_identical_to_canonical() {
    let core = core("deprecation_warnings = false\n");
    let canonical = record(&core, "session:session_created");
    let legacy = record(&core, "session:started");

    let mut payload = serde_json::Map::new();
    payload.insert("id".into(), json!("session-alpha"));
    let envelope = core
        .bus()
        .emit_standardized("session", "session_created", payload);
    core.shim().publish_aliases(core.bus(), &envelope);

    assert_eq!(canonical.lock().unwrap()[0].1, legacy.lock().unwrap()[0].1);
    assert!(core.registry().is_deprecated("session:started"));
    assert_eq!(
        core.registry().modern_name("session:started"),
        Some("session:session_created")
    );
}

#[tokio::test]
async fn scoped_context_flows_into_derived_children() {
    let core = core("");
    let root = core.context("batch", "cli");
    let trace = root.trace_id().to_string();

    let child = root
        .clone()
        .scope(async { core.context("createTask", "task") })
        .await;

    assert_eq!(child.trace_id(), trace);
    assert_ne!(child.request_id(), root.request_id());
    assert_eq!(child.parent().map(OperationContext::request_id), Some(root.request_id()));
}
