// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use knoa_core::testing::EventRecorder;
use knoa_core::{CoreConfig, CorrelationIds, ErrorKind, FakeClock};
use serde_json::json;
use yare::parameterized;

fn setup() -> (Core, Arc<FakeFeedbackManager>, FeedbackAdapter<FakeFeedbackManager>) {
    let core = Core::builder(CoreConfig::default())
        .clock(Arc::new(FakeClock::new()))
        .ids(CorrelationIds::sequential())
        .build();
    let manager = Arc::new(FakeFeedbackManager::new());
    let adapter = FeedbackAdapter::new(core.clone(), Arc::clone(&manager));
    (core, manager, adapter)
}

fn note(message: &str) -> NewFeedback {
    NewFeedback {
        message: message.to_string(),
        task_id: Some("T001".to_string()),
    }
}

#[tokio::test]
async fn create_starts_pending_and_publishes() {
    let (core, _, adapter) = setup();
    let all = EventRecorder::attach(core.bus(), "*");

    let feedback = adapter
        .create_feedback(note("rename the flag"))
        .await
        .unwrap()
        .completed()
        .unwrap();

    assert_eq!(feedback.status, FeedbackStatus::Pending);
    assert_eq!(
        all.names(),
        vec!["feedback:feedback_created", "event", "feedback:created"]
    );
    let created = &all.named("feedback:feedback_created")[0];
    assert_eq!(created["message"], json!("rename the flag"));
    assert_eq!(created["taskId"], json!("T001"));
    assert_eq!(created["status"], json!("pending"));
}

#[tokio::test]
async fn malformed_task_reference_is_rejected() {
    let (_, manager, adapter) = setup();
    let input = NewFeedback {
        message: "x".into(),
        task_id: Some("task-1".into()),
    };

    let outcome = adapter.create_feedback(input).await.unwrap();

    let envelope = outcome.envelope().unwrap();
    assert_eq!(envelope.context["argument"], json!("taskId"));
    assert!(manager.calls().is_empty());
}

#[parameterized(
    in_progress = { "in_progress", FeedbackStatus::InProgress },
    resolved = { "resolved", FeedbackStatus::Resolved },
    dismissed = { "dismissed", FeedbackStatus::Dismissed },
)]
#[test_macro(tokio::test)]
async fn status_transitions(name: &str, expected: FeedbackStatus) {
    let (core, _, adapter) = setup();
    adapter.create_feedback(note("x")).await.unwrap();
    let all = EventRecorder::attach(core.bus(), "feedback:*");

    let feedback = adapter
        .update_feedback_status("FB-1", name)
        .await
        .unwrap()
        .completed()
        .unwrap();

    assert_eq!(feedback.status, expected);
    assert_eq!(
        all.names(),
        vec!["feedback:feedback_status_changed", "feedback:updated"]
    );
}

#[tokio::test]
async fn unknown_status_never_reaches_the_manager() {
    let (_, manager, adapter) = setup();

    let outcome = adapter
        .update_feedback_status("FB-1", "archived")
        .await
        .unwrap();

    let envelope = outcome.envelope().unwrap();
    assert_eq!(envelope.kind(), Some(ErrorKind::Validation));
    assert!(envelope.message.contains("resolved"));
    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn updating_missing_feedback_is_an_envelope() {
    let (_, _, adapter) = setup();

    let outcome = adapter
        .update_feedback_status("FB-9", "resolved")
        .await
        .unwrap();

    assert_eq!(
        outcome.envelope().map(|e| e.code.as_str()),
        Some("ERR_NOT_FOUND")
    );
}

#[tokio::test]
async fn get_is_silent() {
    let (core, _, adapter) = setup();
    adapter.create_feedback(note("x")).await.unwrap();
    let all = EventRecorder::attach(core.bus(), "*");

    let feedback = adapter.get_feedback("FB-1").await.unwrap().completed();

    assert_eq!(feedback.map(|f| f.message), Some("x".to_string()));
    assert!(all.events().is_empty());
}
