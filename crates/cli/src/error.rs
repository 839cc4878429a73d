// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing rendering of failure envelopes
//!
//! A failure shows what went wrong, the context the error handler attached,
//! and suggestions keyed on the error kind.

use knoa_core::{ErrorEnvelope, ErrorKind};
use std::fmt;
use std::process::ExitCode;

/// Context keys shown to the user, in display order
const SHOWN_CONTEXT: [&str; 4] = ["argument", "expected", "taskId", "traceId"];

#[derive(Debug)]
pub struct Failure {
    /// What went wrong
    pub message: String,
    pub kind: Option<ErrorKind>,
    /// `key: value` lines from the envelope context
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
}

impl Failure {
    pub fn from_envelope(envelope: &ErrorEnvelope) -> Self {
        let kind = envelope.kind();
        let context = SHOWN_CONTEXT
            .iter()
            .filter_map(|key| {
                envelope.context.get(*key).map(|value| match value.as_str() {
                    Some(text) => format!("{key}: {text}"),
                    None => format!("{key}: {value}"),
                })
            })
            .collect();
        Self {
            message: envelope.message.clone(),
            kind,
            context,
            suggestions: suggestions_for(kind, &envelope.operation),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self.kind {
            Some(ErrorKind::Validation) => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}

fn suggestions_for(kind: Option<ErrorKind>, operation: &str) -> Vec<String> {
    match kind {
        Some(ErrorKind::Validation) => vec![format!(
            "Check the arguments of {operation}: knoa --help"
        )],
        Some(ErrorKind::NotFound) => vec!["List known tasks: knoa task list".to_string()],
        Some(ErrorKind::Storage) | Some(ErrorKind::DataConsistency) => vec![
            "Check that the --root directory is writable".to_string(),
            "Inspect the latest-*.json snapshots for hand edits".to_string(),
        ],
        Some(ErrorKind::LockTimeout) => {
            vec!["Another knoa process may hold the state; retry shortly".to_string()]
        }
        _ => Vec::new(),
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knoa_core::KnoaError;

    fn envelope(error: KnoaError) -> ErrorEnvelope {
        error.to_envelope("addGitCommitToTask")
    }

    #[test]
    fn validation_failures_exit_two() {
        let failure = Failure::from_envelope(&envelope(
            KnoaError::validation("Invalid taskId").with_context("argument", "taskId"),
        ));

        assert_eq!(failure.exit_code(), ExitCode::from(2));
        assert_eq!(failure.context, vec!["argument: taskId"]);
    }

    #[test]
    fn other_failures_exit_one() {
        let failure = Failure::from_envelope(&envelope(KnoaError::storage("disk full")));
        assert_eq!(failure.exit_code(), ExitCode::FAILURE);
        assert_eq!(failure.suggestions.len(), 2);
    }

    #[test]
    fn display_lists_context_and_numbered_suggestions() {
        let failure = Failure::from_envelope(&envelope(
            KnoaError::not_found("Task T404 not found").with_context("taskId", "T404"),
        ));

        let rendered = failure.to_string();

        assert!(rendered.starts_with("error: Task T404 not found\n"));
        assert!(rendered.contains("  -> taskId: T404"));
        assert!(rendered.contains("  1. List known tasks: knoa task list"));
    }
}
