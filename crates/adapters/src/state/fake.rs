// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake state manager for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::StateManager;
use crate::fake::{CallLog, FailureQueue};
use crate::model::ProjectState;
use knoa_core::{KnoaError, OperationContext};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum StateCall {
    Get,
    Update { keys: Vec<String>, trace_id: String },
    SetPhase { phase: String },
}

#[derive(Clone, Default)]
pub struct FakeStateManager {
    state: Arc<Mutex<ProjectState>>,
    calls: CallLog<StateCall>,
    failures: FailureQueue,
}

impl FakeStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<StateCall> {
        self.calls.all()
    }

    pub fn fail_next(&self, error: KnoaError) {
        self.failures.push(error);
    }

    pub fn snapshot(&self) -> ProjectState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl StateManager for FakeStateManager {
    fn get_state(&self, _ctx: &OperationContext) -> Result<ProjectState, KnoaError> {
        self.calls.record(StateCall::Get);
        self.failures.check()?;
        Ok(self.snapshot())
    }

    fn update_state(
        &self,
        ctx: &OperationContext,
        changes: &Map<String, Value>,
    ) -> Result<ProjectState, KnoaError> {
        self.calls.record(StateCall::Update {
            keys: changes.keys().cloned().collect(),
            trace_id: ctx.trace_id().to_string(),
        });
        self.failures.check()?;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.merge(changes)?;
        Ok(state.clone())
    }

    fn set_phase(&self, _ctx: &OperationContext, phase: &str) -> Result<ProjectState, KnoaError> {
        self.calls.record(StateCall::SetPhase {
            phase: phase.to_string(),
        });
        self.failures.check()?;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.phase = phase.to_string();
        Ok(state.clone())
    }
}
