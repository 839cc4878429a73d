// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! knoa - workflow tracker CLI

mod commands;
mod error;
mod logging;
mod output;
mod store;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{events, state, task};
use knoa_adapters::{StateAdapter, TaskAdapter};
use knoa_core::{Core, CoreConfig, Storage};
use knoa_storage::{JsonStore, SnapshotStore};
use output::OutputFormat;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use store::{FileStateManager, FileTaskManager};

const CONFIG_FILE: &str = "knoa.toml";

#[derive(Parser)]
#[command(
    name = "knoa",
    version,
    about = "knoa - tasks, sessions and handovers for AI-assisted development"
)]
struct Cli {
    /// Directory holding knoa.toml and the JSON snapshots
    #[arg(long, global = true, default_value = ".knoa")]
    root: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print every emitted event to stderr as a JSON line
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List canonical event names and their legacy aliases
    Events,
    /// Task management
    Task(task::TaskArgs),
    /// Project state
    State(state::StateArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.root.join(CONFIG_FILE);
    let config = CoreConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    logging::setup_logging(config_path.exists().then_some(config.log_level));

    let core = Core::new(config);
    if cli.trace {
        trace_events(&core);
    }

    match cli.command {
        Commands::Events => {
            events::handle(core.registry(), cli.format);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Task(args) => {
            let (manager, _) = open_managers(&core, &cli.root)?;
            let adapter = TaskAdapter::new(core.clone(), Arc::new(manager));
            task::handle(&adapter, args.command, cli.format).await
        }
        Commands::State(args) => {
            let (_, manager) = open_managers(&core, &cli.root)?;
            let adapter = StateAdapter::new(core.clone(), Arc::new(manager));
            state::handle(&adapter, args.command, cli.format)
        }
    }
}

fn open_managers(core: &Core, root: &Path) -> Result<(FileTaskManager, FileStateManager)> {
    let store = JsonStore::open(root)
        .with_context(|| format!("opening store at {}", root.display()))?;
    let storage: Arc<dyn Storage> = Arc::new(store);
    let snapshots = SnapshotStore::new(storage);
    let clock = Arc::clone(core.clock());
    Ok((
        FileTaskManager::new(snapshots.clone(), Arc::clone(&clock)),
        FileStateManager::new(snapshots, clock),
    ))
}

fn trace_events(core: &Core) {
    let _ = core.bus().subscribe("*", |payload, name| {
        let line = serde_json::json!({ "event": name, "payload": payload });
        eprintln!("{line}");
        Ok(())
    });
}
