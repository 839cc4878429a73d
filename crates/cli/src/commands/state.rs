// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `knoa state`

use crate::output::{print, report, OutputFormat};
use clap::{Args, Subcommand};
use knoa_adapters::{ProjectState, StateAdapter, StateManager};
use serde::Serialize;
use std::fmt;
use std::process::ExitCode;

#[derive(Args)]
pub struct StateArgs {
    #[command(subcommand)]
    pub command: StateCommand,
}

#[derive(Subcommand)]
pub enum StateCommand {
    /// Show the project state
    Show,
    /// Move the project to a new phase
    Phase { phase: String },
}

#[derive(Serialize)]
#[serde(transparent)]
struct StateView<'a>(&'a ProjectState);

impl fmt::Display for StateView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Phase: {}", self.0.phase)?;
        if let Some(task) = &self.0.current_task {
            writeln!(f, "  Task: {}", task)?;
        }
        if let Some(session) = &self.0.current_session {
            writeln!(f, "  Session: {}", session)?;
        }
        if let Some(updated) = &self.0.updated_at {
            write!(f, "  Updated: {}", updated)?;
        }
        Ok(())
    }
}

pub fn handle<M: StateManager + ?Sized>(
    adapter: &StateAdapter<M>,
    command: StateCommand,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let show = |state: &ProjectState, format: OutputFormat| print(&StateView(state), format);
    let outcome = match command {
        StateCommand::Show => adapter.get_state()?,
        StateCommand::Phase { phase } => adapter.set_phase(&phase)?,
    };
    Ok(report(outcome, format, show))
}
