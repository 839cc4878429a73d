// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project state adapter
//!
//! State lives in one small document, so the manager is synchronous and the
//! adapter runs on [`AdapterBase::run_sync`].

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeStateManager, StateCall};

use crate::base::{params, AdapterBase, Operation};
use crate::model::ProjectState;
use crate::outcome::AdapterResult;
use knoa_core::{Check, Core, KnoaError, OperationContext, ParamSchema};
use serde_json::{Map, Value};
use std::sync::{Arc, LazyLock};

static GET_STATE: LazyLock<Operation> =
    LazyLock::new(|| Operation::query("getState", ParamSchema::new()));

static UPDATE_STATE: LazyLock<Operation> = LazyLock::new(|| {
    Operation::command(
        "updateState",
        "state_changed",
        ParamSchema::new().required("changes", Some(Check::object())),
    )
});

static SET_PHASE: LazyLock<Operation> = LazyLock::new(|| {
    Operation::command(
        "setPhase",
        "phase_changed",
        ParamSchema::new().required("phase", Some(Check::non_empty_string())),
    )
});

pub trait StateManager: Send + Sync {
    fn get_state(&self, ctx: &OperationContext) -> Result<ProjectState, KnoaError>;

    /// Merge `changes` and return the new state
    fn update_state(
        &self,
        ctx: &OperationContext,
        changes: &Map<String, Value>,
    ) -> Result<ProjectState, KnoaError>;

    fn set_phase(&self, ctx: &OperationContext, phase: &str) -> Result<ProjectState, KnoaError>;
}

pub struct StateAdapter<M: ?Sized> {
    base: AdapterBase,
    manager: Arc<M>,
}

impl<M: ?Sized> Clone for StateAdapter<M> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<M: StateManager + ?Sized> StateAdapter<M> {
    pub fn new(core: Core, manager: Arc<M>) -> Self {
        Self {
            base: AdapterBase::new(core, "StateAdapter", "state"),
            manager,
        }
    }

    pub fn with_context(&self, ctx: OperationContext) -> Self {
        Self {
            base: self.base.with_context(ctx),
            manager: Arc::clone(&self.manager),
        }
    }

    pub fn get_state(&self) -> AdapterResult<ProjectState> {
        self.base
            .run_sync(&GET_STATE, Map::new(), |ctx| self.manager.get_state(ctx))
    }

    pub fn update_state(&self, changes: Map<String, Value>) -> AdapterResult<ProjectState> {
        let params = params([("changes", Value::Object(changes.clone()))]);
        self.base.run_sync(&UPDATE_STATE, params, |ctx| {
            self.manager.update_state(ctx, &changes)
        })
    }

    pub fn set_phase(&self, phase: &str) -> AdapterResult<ProjectState> {
        let params = params([("phase", Value::from(phase))]);
        self.base
            .run_sync(&SET_PHASE, params, |ctx| self.manager.set_phase(ctx, phase))
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
