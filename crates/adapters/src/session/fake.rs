// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake session manager for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::SessionManager;
use crate::fake::{CallLog, FailureQueue};
use crate::model::{NewSession, Session, SessionStatus};
use async_trait::async_trait;
use knoa_core::{KnoaError, OperationContext};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    Create { id: String },
    End { id: String, handover: String },
    Get { id: String },
    LinkCommit { id: String, hash: String },
}

#[derive(Clone, Default)]
pub struct FakeSessionManager {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    calls: CallLog<SessionCall>,
    failures: FailureQueue,
}

impl FakeSessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.all()
    }

    pub fn fail_next(&self, error: KnoaError) {
        self.failures.push(error);
    }

    fn with_session<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Session) -> Result<R, KnoaError>,
    ) -> Result<R, KnoaError> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        match sessions.get_mut(id) {
            Some(session) => f(session),
            None => Err(KnoaError::not_found(format!("Session {id} not found"))
                .with_context("sessionId", id)),
        }
    }
}

#[async_trait]
impl SessionManager for FakeSessionManager {
    async fn create_session(
        &self,
        _ctx: &OperationContext,
        input: NewSession,
    ) -> Result<Session, KnoaError> {
        self.calls.record(SessionCall::Create {
            id: input.id.clone(),
        });
        self.failures.check()?;

        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        if sessions.contains_key(&input.id) {
            return Err(KnoaError::state(format!("Session {} already exists", input.id))
                .with_context("sessionId", input.id.as_str()));
        }
        let session = Session::start(input);
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn end_session(
        &self,
        _ctx: &OperationContext,
        id: &str,
        handover: &str,
    ) -> Result<Session, KnoaError> {
        self.calls.record(SessionCall::End {
            id: id.to_string(),
            handover: handover.to_string(),
        });
        self.failures.check()?;
        self.with_session(id, |session| {
            if session.status == SessionStatus::Ended {
                return Err(KnoaError::state(format!("Session {id} already ended"))
                    .with_context("sessionId", id));
            }
            session.status = SessionStatus::Ended;
            session.handover = Some(handover.to_string());
            Ok(session.clone())
        })
    }

    async fn get_session(&self, _ctx: &OperationContext, id: &str) -> Result<Session, KnoaError> {
        self.calls.record(SessionCall::Get { id: id.to_string() });
        self.failures.check()?;
        self.with_session(id, |session| Ok(session.clone()))
    }

    async fn link_commit(
        &self,
        _ctx: &OperationContext,
        id: &str,
        commit_hash: &str,
    ) -> Result<Session, KnoaError> {
        self.calls.record(SessionCall::LinkCommit {
            id: id.to_string(),
            hash: commit_hash.to_string(),
        });
        self.failures.check()?;
        self.with_session(id, |session| {
            if !session.commits.iter().any(|c| c == commit_hash) {
                session.commits.push(commit_hash.to_string());
            }
            Ok(session.clone())
        })
    }
}
