// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake feedback manager for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::FeedbackManager;
use crate::fake::{CallLog, FailureQueue};
use crate::model::{Feedback, FeedbackStatus, NewFeedback};
use async_trait::async_trait;
use knoa_core::{KnoaError, OperationContext};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackCall {
    Create { message: String },
    UpdateStatus { id: String, status: FeedbackStatus },
    Get { id: String },
}

/// In-memory feedback manager; ids are `FB-1`, `FB-2`, ...
#[derive(Clone, Default)]
pub struct FakeFeedbackManager {
    items: Arc<Mutex<BTreeMap<String, Feedback>>>,
    calls: CallLog<FeedbackCall>,
    failures: FailureQueue,
}

impl FakeFeedbackManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<FeedbackCall> {
        self.calls.all()
    }

    pub fn fail_next(&self, error: KnoaError) {
        self.failures.push(error);
    }

    fn lookup(items: &BTreeMap<String, Feedback>, id: &str) -> Result<Feedback, KnoaError> {
        items.get(id).cloned().ok_or_else(|| {
            KnoaError::not_found(format!("Feedback {id} not found")).with_context("feedbackId", id)
        })
    }
}

#[async_trait]
impl FeedbackManager for FakeFeedbackManager {
    async fn create_feedback(
        &self,
        _ctx: &OperationContext,
        input: NewFeedback,
    ) -> Result<Feedback, KnoaError> {
        self.calls.record(FeedbackCall::Create {
            message: input.message.clone(),
        });
        self.failures.check()?;

        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        let feedback = Feedback {
            id: format!("FB-{}", items.len() + 1),
            message: input.message,
            status: FeedbackStatus::Pending,
            task_id: input.task_id,
            created_at: None,
        };
        items.insert(feedback.id.clone(), feedback.clone());
        Ok(feedback)
    }

    async fn update_status(
        &self,
        _ctx: &OperationContext,
        id: &str,
        status: FeedbackStatus,
    ) -> Result<Feedback, KnoaError> {
        self.calls.record(FeedbackCall::UpdateStatus {
            id: id.to_string(),
            status,
        });
        self.failures.check()?;

        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        let mut feedback = Self::lookup(&items, id)?;
        feedback.status = status;
        items.insert(id.to_string(), feedback.clone());
        Ok(feedback)
    }

    async fn get_feedback(&self, _ctx: &OperationContext, id: &str) -> Result<Feedback, KnoaError> {
        self.calls.record(FeedbackCall::Get { id: id.to_string() });
        self.failures.check()?;
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Self::lookup(&items, id)
    }
}
