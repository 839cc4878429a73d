// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Re-emission of legacy event names

use super::bus::EventBus;
use super::envelope::StandardEnvelope;
use super::registry::EventNameRegistry;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Publishes every registered alias of an emitted canonical event
#[derive(Clone)]
pub struct CompatibilityShim {
    registry: Arc<EventNameRegistry>,
    warnings: bool,
    warned: Arc<Mutex<HashSet<String>>>,
}

impl CompatibilityShim {
    pub fn new(registry: Arc<EventNameRegistry>, warnings: bool) -> Self {
        Self {
            registry,
            warnings,
            warned: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn registry(&self) -> &EventNameRegistry {
        &self.registry
    }

    /// Emit the envelope under each alias; returns the alias names used
    pub fn publish_aliases(&self, bus: &EventBus, envelope: &StandardEnvelope) -> Vec<String> {
        let modern = envelope.name();
        let aliases = self.registry.resolve_aliases(&modern).to_vec();
        if aliases.is_empty() {
            return aliases;
        }
        let value = envelope.to_value();
        for alias in &aliases {
            self.warn_once(alias, &modern);
            bus.emit(alias, value.clone());
        }
        aliases
    }

    pub async fn publish_aliases_async(
        &self,
        bus: &EventBus,
        envelope: &StandardEnvelope,
    ) -> Vec<String> {
        let modern = envelope.name();
        let aliases = self.registry.resolve_aliases(&modern).to_vec();
        if aliases.is_empty() {
            return aliases;
        }
        let value = envelope.to_value();
        for alias in &aliases {
            self.warn_once(alias, &modern);
            bus.emit_async(alias, value.clone()).await;
        }
        aliases
    }

    fn warn_once(&self, alias: &str, modern: &str) {
        if !self.warnings {
            return;
        }
        let first = self
            .warned
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(alias.to_string());
        if first {
            tracing::warn!(alias, modern, "deprecated event name emitted; subscribe to the modern name");
        }
    }
}
