// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed managers
//!
//! ```text
//! <root>/latest-tasks.json
//! <root>/task-history/task-T001.json
//! <root>/latest-state.json
//! <root>/state-history/state-<millis>.json
//! ```

use async_trait::async_trait;
use knoa_adapters::{
    NewTask, ProjectState, StateManager, Task, TaskChanges, TaskFilter, TaskManager,
};
use knoa_core::{iso8601, Clock, KnoaError, OperationContext};
use knoa_storage::SnapshotStore;
use serde_json::{Map, Value};
use std::sync::Arc;

const TASKS: &str = "tasks";
const TASK: &str = "task";
const STATE: &str = "state";
const MAX_TASK_NUMBER: u32 = 999;

pub struct FileTaskManager {
    snapshots: SnapshotStore,
    clock: Arc<dyn Clock>,
}

impl FileTaskManager {
    pub fn new(snapshots: SnapshotStore, clock: Arc<dyn Clock>) -> Self {
        Self { snapshots, clock }
    }

    fn load(&self) -> Result<Vec<Task>, KnoaError> {
        Ok(self.snapshots.load_latest(TASKS)?.unwrap_or_default())
    }

    fn save(&self, tasks: &[Task], changed: &Task) -> Result<(), KnoaError> {
        self.snapshots.save_history(TASK, &changed.id, changed)?;
        self.snapshots.save_latest(TASKS, &tasks)?;
        Ok(())
    }

    fn now(&self) -> String {
        iso8601(&self.clock.now())
    }

    /// Apply `f` to task `id` and persist the list
    fn modify(
        &self,
        ctx: &OperationContext,
        id: &str,
        f: impl FnOnce(&mut Task) -> bool,
    ) -> Result<Task, KnoaError> {
        let mut tasks = self.load()?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        if f(task) {
            task.updated_at = Some(self.now());
        }
        let task = task.clone();
        ensure_live(ctx)?;
        self.save(&tasks, &task)?;
        Ok(task)
    }
}

fn not_found(id: &str) -> KnoaError {
    KnoaError::not_found(format!("Task {id} not found")).with_context("taskId", id)
}

/// Writes are skipped once the caller has cancelled
fn ensure_live(ctx: &OperationContext) -> Result<(), KnoaError> {
    if ctx.is_cancelled() {
        return Err(KnoaError::timeout("cancelled before the write")
            .with_context("operation", ctx.operation()));
    }
    Ok(())
}

fn next_task_id(tasks: &[Task]) -> Result<String, KnoaError> {
    let highest = tasks
        .iter()
        .filter_map(|t| t.id.strip_prefix('T'))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    if highest >= MAX_TASK_NUMBER {
        return Err(KnoaError::state("task ids are exhausted (T999 reached)"));
    }
    Ok(format!("T{:03}", highest + 1))
}

#[async_trait]
impl TaskManager for FileTaskManager {
    async fn create_task(&self, ctx: &OperationContext, input: NewTask) -> Result<Task, KnoaError> {
        let mut tasks = self.load()?;
        let mut task = Task::new(next_task_id(&tasks)?, input.title);
        task.description = input.description;
        task.created_at = Some(self.now());
        tasks.push(task.clone());
        ensure_live(ctx)?;
        self.save(&tasks, &task)?;
        tracing::debug!(id = %task.id, "task created");
        Ok(task)
    }

    async fn update_task(
        &self,
        ctx: &OperationContext,
        id: &str,
        changes: TaskChanges,
    ) -> Result<Task, KnoaError> {
        self.modify(ctx, id, |task| task.apply(&changes))
    }

    async fn get_task(&self, _ctx: &OperationContext, id: &str) -> Result<Task, KnoaError> {
        self.load()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(id))
    }

    async fn list_tasks(
        &self,
        _ctx: &OperationContext,
        filter: TaskFilter,
    ) -> Result<Vec<Task>, KnoaError> {
        let mut tasks = self.load()?;
        tasks.retain(|t| filter.matches(t));
        Ok(tasks)
    }

    async fn delete_task(&self, ctx: &OperationContext, id: &str) -> Result<Task, KnoaError> {
        let mut tasks = self.load()?;
        let index = tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        let removed = tasks.remove(index);
        ensure_live(ctx)?;
        self.snapshots.save_latest(TASKS, &tasks)?;
        Ok(removed)
    }

    async fn add_git_commit(
        &self,
        ctx: &OperationContext,
        id: &str,
        commit_hash: &str,
    ) -> Result<Task, KnoaError> {
        self.modify(ctx, id, |task| task.link_commit(commit_hash))
    }
}

pub struct FileStateManager {
    snapshots: SnapshotStore,
    clock: Arc<dyn Clock>,
}

impl FileStateManager {
    pub fn new(snapshots: SnapshotStore, clock: Arc<dyn Clock>) -> Self {
        Self { snapshots, clock }
    }

    fn load(&self) -> Result<ProjectState, KnoaError> {
        Ok(self.snapshots.load_latest(STATE)?.unwrap_or_default())
    }

    fn store(&self, mut state: ProjectState) -> Result<ProjectState, KnoaError> {
        let now = self.clock.now();
        state.updated_at = Some(iso8601(&now));
        let id = now.timestamp_millis().to_string();
        self.snapshots.record(STATE, &id, &state)?;
        Ok(state)
    }
}

impl StateManager for FileStateManager {
    fn get_state(&self, _ctx: &OperationContext) -> Result<ProjectState, KnoaError> {
        self.load()
    }

    fn update_state(
        &self,
        ctx: &OperationContext,
        changes: &Map<String, Value>,
    ) -> Result<ProjectState, KnoaError> {
        let mut state = self.load()?;
        state.merge(changes)?;
        ensure_live(ctx)?;
        self.store(state)
    }

    fn set_phase(&self, ctx: &OperationContext, phase: &str) -> Result<ProjectState, KnoaError> {
        let mut state = self.load()?;
        state.phase = phase.to_string();
        ensure_live(ctx)?;
        self.store(state)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
