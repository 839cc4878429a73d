// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `knoa task`

use crate::output::{print, print_list, report, OutputFormat};
use clap::{Args, Subcommand, ValueEnum};
use knoa_adapters::{NewTask, Task, TaskAdapter, TaskChanges, TaskFilter, TaskManager, TaskStatus};
use serde::Serialize;
use std::fmt;
use std::process::ExitCode;

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Create a task
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List tasks
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Show one task
    Show {
        /// Task id, e.g. T001
        id: String,
    },
    /// Change a task's title or status
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Link a git commit to a task
    Commit {
        id: String,
        /// 7 to 40 hex characters
        hash: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    InProgress,
    Completed,
    Blocked,
}

impl From<StatusArg> for TaskStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => TaskStatus::Pending,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Completed => TaskStatus::Completed,
            StatusArg::Blocked => TaskStatus::Blocked,
        }
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct TaskRow(Task);

impl fmt::Display for TaskRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = serde_json::to_value(self.0.status)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        write!(f, "{:<6} {:<12} {}", self.0.id, status, self.0.title)?;
        if !self.0.commits.is_empty() {
            write!(f, " [{}]", self.0.commits.join(", "))?;
        }
        Ok(())
    }
}

pub async fn handle<M: TaskManager + ?Sized>(
    adapter: &TaskAdapter<M>,
    command: TaskCommand,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let show = |task: &Task, format: OutputFormat| print(&TaskRow(task.clone()), format);
    let code = match command {
        TaskCommand::Create { title, description } => {
            let input = NewTask { title, description };
            report(adapter.create_task(input).await?, format, show)
        }
        TaskCommand::List { status } => {
            let filter = TaskFilter {
                status: status.map(TaskStatus::from),
            };
            report(adapter.list_tasks(filter).await?, format, |tasks, format| {
                let rows: Vec<TaskRow> = tasks.iter().cloned().map(TaskRow).collect();
                print_list(&rows, format, "No tasks");
            })
        }
        TaskCommand::Show { id } => report(adapter.get_task(&id).await?, format, show),
        TaskCommand::Update { id, title, status } => {
            let changes = TaskChanges {
                title,
                description: None,
                status: status.map(TaskStatus::from),
            };
            if changes.is_empty() {
                anyhow::bail!("nothing to update: pass --title or --status");
            }
            report(adapter.update_task(&id, changes).await?, format, show)
        }
        TaskCommand::Commit { id, hash } => report(
            adapter.add_git_commit_to_task(&id, &hash).await?,
            format,
            show,
        ),
    };
    Ok(code)
}
