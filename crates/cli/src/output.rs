// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use crate::error::Failure;
use clap::ValueEnum;
use knoa_adapters::Outcome;
use serde::Serialize;
use std::fmt;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + fmt::Display>(items: &[T], format: OutputFormat, empty: &str) {
    match format {
        OutputFormat::Text if items.is_empty() => println!("{}", empty),
        OutputFormat::Text => {
            for item in items {
                println!("{}", item);
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(items) {
                println!("{}", json);
            }
        }
    }
}

/// Print whatever an adapter handed back and pick the exit code
///
/// Validation envelopes exit 2, other failures exit 1.
pub fn report<T, F>(outcome: Outcome<T>, format: OutputFormat, show: F) -> ExitCode
where
    T: Serialize,
    F: FnOnce(&T, OutputFormat),
{
    match outcome {
        Outcome::Completed(value) => {
            show(&value, format);
            ExitCode::SUCCESS
        }
        Outcome::Recovered(value) => {
            match format {
                OutputFormat::Text => println!("recovered: {}", value),
                OutputFormat::Json => {
                    if let Ok(json) = serde_json::to_string_pretty(&value) {
                        println!("{}", json);
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Outcome::Failed(envelope) => {
            let failure = Failure::from_envelope(&envelope);
            match format {
                OutputFormat::Text => eprint!("{}", failure),
                OutputFormat::Json => {
                    if let Ok(json) = serde_json::to_string_pretty(&envelope) {
                        println!("{}", json);
                    }
                }
            }
            failure.exit_code()
        }
    }
}
