// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task adapter

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTaskManager, TaskCall};

use crate::base::{params, to_params, AdapterBase, Operation};
use crate::model::{NewTask, Task, TaskChanges, TaskFilter};
use crate::outcome::{AdapterResult, ErrorPolicy};
use async_trait::async_trait;
use knoa_core::{Check, Core, KnoaError, OperationContext, ParamSchema, Validator};
use serde_json::Value;
use std::sync::{Arc, LazyLock};

const STATUS_NAMES: &[&str] = &["pending", "in_progress", "completed", "blocked"];

static CREATE_TASK: LazyLock<Operation> = LazyLock::new(|| {
    Operation::command(
        "createTask",
        "task_created",
        ParamSchema::new()
            .required("title", Some(Check::non_empty_string()))
            .optional("description", Check::string()),
    )
    .validating("task")
});

static UPDATE_TASK: LazyLock<Operation> = LazyLock::new(|| {
    Operation::command(
        "updateTask",
        "task_updated",
        ParamSchema::new()
            .required("taskId", Some(Check::task_id()))
            .optional("title", Check::non_empty_string())
            .optional("status", Check::one_of(STATUS_NAMES)),
    )
});

static GET_TASK: LazyLock<Operation> = LazyLock::new(|| {
    Operation::query(
        "getTask",
        ParamSchema::new().required("taskId", Some(Check::task_id())),
    )
});

static LIST_TASKS: LazyLock<Operation> = LazyLock::new(|| {
    Operation::query(
        "listTasks",
        ParamSchema::new().optional("status", Check::one_of(STATUS_NAMES)),
    )
    .with_policy(ErrorPolicy::Envelope)
});

static DELETE_TASK: LazyLock<Operation> = LazyLock::new(|| {
    Operation::command(
        "deleteTask",
        "task_deleted",
        ParamSchema::new().required("taskId", Some(Check::task_id())),
    )
});

static ADD_GIT_COMMIT: LazyLock<Operation> = LazyLock::new(|| {
    Operation::command(
        "addGitCommitToTask",
        "task_commit_linked",
        ParamSchema::new()
            .required("taskId", Some(Check::task_id()))
            .required("commitHash", Some(Check::commit_hash())),
    )
});

/// Owns task persistence and rules; raises typed errors
#[async_trait]
pub trait TaskManager: Send + Sync {
    async fn create_task(&self, ctx: &OperationContext, input: NewTask) -> Result<Task, KnoaError>;

    async fn update_task(
        &self,
        ctx: &OperationContext,
        id: &str,
        changes: TaskChanges,
    ) -> Result<Task, KnoaError>;

    /// `not_found` when absent
    async fn get_task(&self, ctx: &OperationContext, id: &str) -> Result<Task, KnoaError>;

    async fn list_tasks(
        &self,
        ctx: &OperationContext,
        filter: TaskFilter,
    ) -> Result<Vec<Task>, KnoaError>;

    /// Returns the removed task
    async fn delete_task(&self, ctx: &OperationContext, id: &str) -> Result<Task, KnoaError>;

    async fn add_git_commit(
        &self,
        ctx: &OperationContext,
        id: &str,
        commit_hash: &str,
    ) -> Result<Task, KnoaError>;
}

pub struct TaskAdapter<M: ?Sized> {
    base: AdapterBase,
    manager: Arc<M>,
}

impl<M: ?Sized> Clone for TaskAdapter<M> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<M: TaskManager + ?Sized> TaskAdapter<M> {
    pub fn new(core: Core, manager: Arc<M>) -> Self {
        Self {
            base: AdapterBase::new(core, "TaskAdapter", "task"),
            manager,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.base = self.base.with_validator(validator);
        self
    }

    /// Run subsequent calls under `ctx`
    pub fn with_context(&self, ctx: OperationContext) -> Self {
        Self {
            base: self.base.with_context(ctx),
            manager: Arc::clone(&self.manager),
        }
    }

    pub fn manager(&self) -> &Arc<M> {
        &self.manager
    }

    pub async fn create_task(&self, input: NewTask) -> AdapterResult<Task> {
        let params = to_params(&input);
        self.base
            .run(&CREATE_TASK, params, |ctx| async move {
                self.manager.create_task(&ctx, input).await
            })
            .await
    }

    pub async fn update_task(&self, task_id: &str, changes: TaskChanges) -> AdapterResult<Task> {
        let mut params = to_params(&changes);
        params.insert("taskId".into(), Value::from(task_id));
        self.base
            .run(&UPDATE_TASK, params, |ctx| async move {
                self.manager.update_task(&ctx, task_id, changes).await
            })
            .await
    }

    pub async fn get_task(&self, task_id: &str) -> AdapterResult<Task> {
        self.base
            .run(&GET_TASK, params([("taskId", Value::from(task_id))]), |ctx| async move {
                self.manager.get_task(&ctx, task_id).await
            })
            .await
    }

    pub async fn list_tasks(&self, filter: TaskFilter) -> AdapterResult<Vec<Task>> {
        let params = to_params(&filter);
        self.base
            .run(&LIST_TASKS, params, |ctx| async move {
                self.manager.list_tasks(&ctx, filter).await
            })
            .await
    }

    pub async fn delete_task(&self, task_id: &str) -> AdapterResult<Task> {
        self.base
            .run(&DELETE_TASK, params([("taskId", Value::from(task_id))]), |ctx| async move {
                self.manager.delete_task(&ctx, task_id).await
            })
            .await
    }

    pub async fn add_git_commit_to_task(
        &self,
        task_id: &str,
        commit_hash: &str,
    ) -> AdapterResult<Task> {
        let params = params([
            ("taskId", Value::from(task_id)),
            ("commitHash", Value::from(commit_hash)),
        ]);
        self.base
            .run(&ADD_GIT_COMMIT, params, |ctx| async move {
                self.manager.add_git_commit(&ctx, task_id, commit_hash).await
            })
            .await
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
