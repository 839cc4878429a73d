// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feedback adapter

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFeedbackManager, FeedbackCall};

use crate::base::{params, to_params, AdapterBase, Operation};
use crate::model::{Feedback, FeedbackStatus, NewFeedback};
use crate::outcome::AdapterResult;
use async_trait::async_trait;
use knoa_core::{Check, Core, KnoaError, OperationContext, ParamSchema, Validator};
use serde_json::Value;
use std::sync::{Arc, LazyLock};

static CREATE_FEEDBACK: LazyLock<Operation> = LazyLock::new(|| {
    Operation::command(
        "createFeedback",
        "feedback_created",
        ParamSchema::new()
            .required("message", Some(Check::non_empty_string()))
            .optional("taskId", Check::task_id()),
    )
    .validating("feedback")
});

static UPDATE_STATUS: LazyLock<Operation> = LazyLock::new(|| {
    Operation::command(
        "updateFeedbackStatus",
        "feedback_status_changed",
        ParamSchema::new()
            .required("feedbackId", Some(Check::non_empty_string()))
            .required("status", Some(Check::one_of(FeedbackStatus::NAMES))),
    )
});

static GET_FEEDBACK: LazyLock<Operation> = LazyLock::new(|| {
    Operation::query(
        "getFeedback",
        ParamSchema::new().required("feedbackId", Some(Check::non_empty_string())),
    )
});

#[async_trait]
pub trait FeedbackManager: Send + Sync {
    /// New feedback starts `pending`
    async fn create_feedback(
        &self,
        ctx: &OperationContext,
        input: NewFeedback,
    ) -> Result<Feedback, KnoaError>;

    async fn update_status(
        &self,
        ctx: &OperationContext,
        id: &str,
        status: FeedbackStatus,
    ) -> Result<Feedback, KnoaError>;

    async fn get_feedback(&self, ctx: &OperationContext, id: &str) -> Result<Feedback, KnoaError>;
}

pub struct FeedbackAdapter<M: ?Sized> {
    base: AdapterBase,
    manager: Arc<M>,
}

impl<M: ?Sized> Clone for FeedbackAdapter<M> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<M: FeedbackManager + ?Sized> FeedbackAdapter<M> {
    pub fn new(core: Core, manager: Arc<M>) -> Self {
        Self {
            base: AdapterBase::new(core, "FeedbackAdapter", "feedback"),
            manager,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.base = self.base.with_validator(validator);
        self
    }

    pub fn with_context(&self, ctx: OperationContext) -> Self {
        Self {
            base: self.base.with_context(ctx),
            manager: Arc::clone(&self.manager),
        }
    }

    pub async fn create_feedback(&self, input: NewFeedback) -> AdapterResult<Feedback> {
        let params = to_params(&input);
        self.base
            .run(&CREATE_FEEDBACK, params, |ctx| async move {
                self.manager.create_feedback(&ctx, input).await
            })
            .await
    }

    /// `status` is checked against the known names before it is parsed
    pub async fn update_feedback_status(
        &self,
        feedback_id: &str,
        status: &str,
    ) -> AdapterResult<Feedback> {
        let params = params([
            ("feedbackId", Value::from(feedback_id)),
            ("status", Value::from(status)),
        ]);
        self.base
            .run(&UPDATE_STATUS, params, |ctx| async move {
                let status: FeedbackStatus = status.parse()?;
                self.manager.update_status(&ctx, feedback_id, status).await
            })
            .await
    }

    pub async fn get_feedback(&self, feedback_id: &str) -> AdapterResult<Feedback> {
        let params = params([("feedbackId", Value::from(feedback_id))]);
        self.base
            .run(&GET_FEEDBACK, params, |ctx| async move {
                self.manager.get_feedback(&ctx, feedback_id).await
            })
            .await
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
