// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake task manager for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::TaskManager;
use crate::fake::{CallLog, FailureQueue};
use crate::model::{NewTask, Task, TaskChanges, TaskFilter};
use async_trait::async_trait;
use knoa_core::{KnoaError, OperationContext};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Recorded task manager call, with the request id it ran under
#[derive(Debug, Clone, PartialEq)]
pub enum TaskCall {
    Create { title: String, request_id: String },
    Update { id: String, request_id: String },
    Get { id: String },
    List,
    Delete { id: String },
    AddCommit { id: String, hash: String },
}

/// In-memory task manager; ids are `T001`, `T002`, ...
#[derive(Clone, Default)]
pub struct FakeTaskManager {
    tasks: Arc<Mutex<BTreeMap<String, Task>>>,
    next: Arc<Mutex<u32>>,
    calls: CallLog<TaskCall>,
    failures: FailureQueue,
}

impl FakeTaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<TaskCall> {
        self.calls.all()
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: KnoaError) {
        self.failures.push(error);
    }

    pub fn insert(&self, task: Task) {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(task.id.clone(), task);
    }

    fn with_task<R>(&self, id: &str, f: impl FnOnce(&mut Task) -> R) -> Result<R, KnoaError> {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks
            .get_mut(id)
            .map(f)
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: &str) -> KnoaError {
    KnoaError::not_found(format!("Task {id} not found")).with_context("taskId", id)
}

#[async_trait]
impl TaskManager for FakeTaskManager {
    async fn create_task(&self, ctx: &OperationContext, input: NewTask) -> Result<Task, KnoaError> {
        self.calls.record(TaskCall::Create {
            title: input.title.clone(),
            request_id: ctx.request_id().to_string(),
        });
        self.failures.check()?;

        let id = {
            let mut next = self.next.lock().unwrap_or_else(|e| e.into_inner());
            *next += 1;
            format!("T{:03}", *next)
        };
        let mut task = Task::new(id, input.title);
        task.description = input.description;
        self.insert(task.clone());
        Ok(task)
    }

    async fn update_task(
        &self,
        ctx: &OperationContext,
        id: &str,
        changes: TaskChanges,
    ) -> Result<Task, KnoaError> {
        self.calls.record(TaskCall::Update {
            id: id.to_string(),
            request_id: ctx.request_id().to_string(),
        });
        self.failures.check()?;
        self.with_task(id, |task| {
            task.apply(&changes);
            task.clone()
        })
    }

    async fn get_task(&self, _ctx: &OperationContext, id: &str) -> Result<Task, KnoaError> {
        self.calls.record(TaskCall::Get { id: id.to_string() });
        self.failures.check()?;
        self.with_task(id, |task| task.clone())
    }

    async fn list_tasks(
        &self,
        _ctx: &OperationContext,
        filter: TaskFilter,
    ) -> Result<Vec<Task>, KnoaError> {
        self.calls.record(TaskCall::List);
        self.failures.check()?;
        let tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        Ok(tasks.values().filter(|t| filter.matches(t)).cloned().collect())
    }

    async fn delete_task(&self, _ctx: &OperationContext, id: &str) -> Result<Task, KnoaError> {
        self.calls.record(TaskCall::Delete { id: id.to_string() });
        self.failures.check()?;
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .ok_or_else(|| not_found(id))
    }

    async fn add_git_commit(
        &self,
        _ctx: &OperationContext,
        id: &str,
        commit_hash: &str,
    ) -> Result<Task, KnoaError> {
        self.calls.record(TaskCall::AddCommit {
            id: id.to_string(),
            hash: commit_hash.to_string(),
        });
        self.failures.check()?;
        self.with_task(id, |task| {
            task.link_commit(commit_hash);
            task.clone()
        })
    }
}
