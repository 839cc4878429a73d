// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalogue of canonical event names and their legacy aliases
//!
//! The registry is assembled once with [`RegistryBuilder`] and is read-only
//! afterwards. Adapters consult it after each successful emission to re-emit
//! the deprecated short names.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Components the standard catalogue reserves
pub const RESERVED_COMPONENTS: [&str; 9] = [
    "cache", "log", "error", "state", "task", "session", "feedback", "cli", "plugin",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid event name: {0} (expected component:action)")]
    InvalidName(String),
    #[error("alias {alias} already maps to {existing}")]
    AliasConflict { alias: String, existing: String },
    #[error("alias {0} shadows a canonical event name")]
    AliasShadowsCanonical(String),
}

/// `[a-z][a-z0-9_]*` on both sides of a single `:`
pub fn is_valid_event_name(name: &str) -> bool {
    let Some((component, action)) = name.split_once(':') else {
        return false;
    };
    is_identifier(component) && is_identifier(action)
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Documentation record for one canonical event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDescriptor {
    pub name: String,
    pub description: String,
    /// Payload fields beyond the envelope (documentation only)
    pub payload: Vec<String>,
    pub aliases: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    events: BTreeMap<String, EventDescriptor>,
    aliases: HashMap<String, String>,
}

impl RegistryBuilder {
    pub fn register_event(
        &mut self,
        name: &str,
        description: &str,
        payload: &[&str],
    ) -> Result<&mut Self, RegistryError> {
        if !is_valid_event_name(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if self.aliases.contains_key(name) {
            return Err(RegistryError::AliasShadowsCanonical(name.to_string()));
        }
        let descriptor = self
            .events
            .entry(name.to_string())
            .or_insert_with(|| EventDescriptor {
                name: name.to_string(),
                description: String::new(),
                payload: Vec::new(),
                aliases: Vec::new(),
            });
        descriptor.description = description.to_string();
        descriptor.payload = payload.iter().map(|f| f.to_string()).collect();
        Ok(self)
    }

    /// Map a legacy name onto a canonical one; registering the same pair twice is a no-op
    pub fn register_alias(&mut self, legacy: &str, modern: &str) -> Result<&mut Self, RegistryError> {
        for name in [legacy, modern] {
            if !is_valid_event_name(name) {
                return Err(RegistryError::InvalidName(name.to_string()));
            }
        }
        if self.events.contains_key(legacy) {
            return Err(RegistryError::AliasShadowsCanonical(legacy.to_string()));
        }
        match self.aliases.get(legacy) {
            Some(existing) if existing == modern => return Ok(self),
            Some(existing) => {
                return Err(RegistryError::AliasConflict {
                    alias: legacy.to_string(),
                    existing: existing.clone(),
                })
            }
            None => {}
        }
        self.aliases.insert(legacy.to_string(), modern.to_string());
        let descriptor = self
            .events
            .entry(modern.to_string())
            .or_insert_with(|| EventDescriptor {
                name: modern.to_string(),
                description: String::new(),
                payload: Vec::new(),
                aliases: Vec::new(),
            });
        descriptor.aliases.push(legacy.to_string());
        Ok(self)
    }

    pub fn build(self) -> EventNameRegistry {
        EventNameRegistry {
            events: self.events,
            aliases: self.aliases,
        }
    }
}

/// Immutable name catalogue
#[derive(Debug, Clone, Default)]
pub struct EventNameRegistry {
    events: BTreeMap<String, EventDescriptor>,
    aliases: HashMap<String, String>,
}

impl EventNameRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The catalogue used by the standard adapters
    pub fn standard() -> Self {
        let mut builder = Self::builder();
        if let Err(e) = populate_standard(&mut builder) {
            // the table below is static; this only fires if it is edited badly
            tracing::error!(error = %e, "standard event catalogue is inconsistent");
        }
        builder.build()
    }

    /// Legacy names to re-emit alongside `modern`
    pub fn resolve_aliases(&self, modern: &str) -> &[String] {
        self.events
            .get(modern)
            .map(|d| d.aliases.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_deprecated(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    /// Canonical name behind a legacy alias
    pub fn modern_name(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub fn descriptor(&self, name: &str) -> Option<&EventDescriptor> {
        self.events.get(name)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.events.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Canonical events in name order
    pub fn events(&self) -> impl Iterator<Item = &EventDescriptor> {
        self.events.values()
    }
}

fn populate_standard(b: &mut RegistryBuilder) -> Result<(), RegistryError> {
    b.register_event("task:task_created", "A task was created", &["id", "title", "status"])?
        .register_event("task:task_updated", "Task fields changed", &["id", "changes"])?
        .register_event("task:task_deleted", "A task was removed", &["id"])?
        .register_event(
            "task:task_commit_linked",
            "A git commit was attached to a task",
            &["taskId", "commitHash"],
        )?
        .register_event(
            "session:session_created",
            "A working session started",
            &["id", "branch"],
        )?
        .register_event(
            "session:session_ended",
            "A session ended with a handover note",
            &["id", "handover"],
        )?
        .register_event(
            "session:session_commit_linked",
            "A commit was linked to the session",
            &["sessionId", "commitHash"],
        )?
        .register_event(
            "feedback:feedback_created",
            "Feedback was recorded",
            &["id", "message", "status"],
        )?
        .register_event(
            "feedback:feedback_status_changed",
            "Feedback moved to a new status",
            &["id", "status"],
        )?
        .register_event("state:state_changed", "Project state was updated", &["changes"])?
        .register_event("state:phase_changed", "The project phase moved", &["phase"])?
        .register_event(
            "error:occurred",
            "An error was handled",
            &["name", "message", "code", "recoverable", "context"],
        )?
        .register_event(
            "error:alert_triggered",
            "An alert threshold fired",
            &["threshold", "severity", "description"],
        )?;

    b.register_alias("task:created", "task:task_created")?
        .register_alias("task:updated", "task:task_updated")?
        .register_alias("task:deleted", "task:task_deleted")?
        .register_alias("task:git_commit_added", "task:task_commit_linked")?
        .register_alias("session:started", "session:session_created")?
        .register_alias("session:ended", "session:session_ended")?
        .register_alias("feedback:created", "feedback:feedback_created")?
        .register_alias("feedback:updated", "feedback:feedback_status_changed")?
        .register_alias("state:changed", "state:state_changed")?;
    Ok(())
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
