// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session adapter
//!
//! A session is identified by the commit it started from or by a
//! `session-<suffix>` slug.

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSessionManager, SessionCall};

use crate::base::{params, to_params, AdapterBase, Operation};
use crate::model::{NewSession, Session};
use crate::outcome::AdapterResult;
use async_trait::async_trait;
use knoa_core::{Check, Core, KnoaError, OperationContext, ParamSchema, Validator};
use serde_json::Value;
use std::sync::{Arc, LazyLock};

static CREATE_SESSION: LazyLock<Operation> = LazyLock::new(|| {
    Operation::command(
        "createSession",
        "session_created",
        ParamSchema::new()
            .required("id", Some(Check::session_id()))
            .optional("branch", Check::non_empty_string())
            .optional("goal", Check::string()),
    )
    .validating("session")
});

static END_SESSION: LazyLock<Operation> = LazyLock::new(|| {
    Operation::command(
        "endSession",
        "session_ended",
        ParamSchema::new()
            .required("sessionId", Some(Check::session_id()))
            .required("handover", Some(Check::non_empty_string())),
    )
});

static GET_SESSION: LazyLock<Operation> = LazyLock::new(|| {
    Operation::query(
        "getSession",
        ParamSchema::new().required("sessionId", Some(Check::session_id())),
    )
});

static LINK_COMMIT: LazyLock<Operation> = LazyLock::new(|| {
    Operation::command(
        "linkCommit",
        "session_commit_linked",
        ParamSchema::new()
            .required("sessionId", Some(Check::session_id()))
            .required("commitHash", Some(Check::commit_hash())),
    )
});

#[async_trait]
pub trait SessionManager: Send + Sync {
    async fn create_session(
        &self,
        ctx: &OperationContext,
        input: NewSession,
    ) -> Result<Session, KnoaError>;

    /// Records the handover note; `state` error if already ended
    async fn end_session(
        &self,
        ctx: &OperationContext,
        id: &str,
        handover: &str,
    ) -> Result<Session, KnoaError>;

    async fn get_session(&self, ctx: &OperationContext, id: &str) -> Result<Session, KnoaError>;

    async fn link_commit(
        &self,
        ctx: &OperationContext,
        id: &str,
        commit_hash: &str,
    ) -> Result<Session, KnoaError>;
}

pub struct SessionAdapter<M: ?Sized> {
    base: AdapterBase,
    manager: Arc<M>,
}

impl<M: ?Sized> Clone for SessionAdapter<M> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<M: SessionManager + ?Sized> SessionAdapter<M> {
    pub fn new(core: Core, manager: Arc<M>) -> Self {
        Self {
            base: AdapterBase::new(core, "SessionAdapter", "session"),
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

    pub async fn create_session(&self, input: NewSession) -> AdapterResult<Session> {
        let params = to_params(&input);
        self.base
            .run(&CREATE_SESSION, params, |ctx| async move {
                self.manager.create_session(&ctx, input).await
            })
            .await
    }

    pub async fn end_session(&self, session_id: &str, handover: &str) -> AdapterResult<Session> {
        let params = params([
            ("sessionId", Value::from(session_id)),
            ("handover", Value::from(handover)),
        ]);
        self.base
            .run(&END_SESSION, params, |ctx| async move {
                self.manager.end_session(&ctx, session_id, handover).await
            })
            .await
    }

    pub async fn get_session(&self, session_id: &str) -> AdapterResult<Session> {
        let params = params([("sessionId", Value::from(session_id))]);
        self.base
            .run(&GET_SESSION, params, |ctx| async move {
                self.manager.get_session(&ctx, session_id).await
            })
            .await
    }

    pub async fn link_commit(&self, session_id: &str, commit_hash: &str) -> AdapterResult<Session> {
        let params = params([
            ("sessionId", Value::from(session_id)),
            ("commitHash", Value::from(commit_hash)),
        ]);
        self.base
            .run(&LINK_COMMIT, params, |ctx| async move {
                self.manager.link_commit(&ctx, session_id, commit_hash).await
            })
            .await
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
