// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The explicit bundle of process-wide collaborators
//!
//! Built once at startup and handed to every adapter. Nothing here is a
//! module-level singleton.

use crate::clock::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::context::OperationContext;
use crate::events::{CompatibilityShim, EventBus, EventNameRegistry};
use crate::handler::{ErrorHandler, HandlerSettings};
use crate::id::CorrelationIds;
use std::sync::Arc;

#[derive(Clone)]
pub struct Core {
    config: Arc<CoreConfig>,
    clock: Arc<dyn Clock>,
    ids: CorrelationIds,
    bus: EventBus,
    errors: ErrorHandler,
    shim: CompatibilityShim,
}

impl Core {
    pub fn new(config: CoreConfig) -> Self {
        CoreBuilder::new(config).build()
    }

    pub fn builder(config: CoreConfig) -> CoreBuilder {
        CoreBuilder::new(config)
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn ids(&self) -> &CorrelationIds {
        &self.ids
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn error_handler(&self) -> &ErrorHandler {
        &self.errors
    }

    pub fn shim(&self) -> &CompatibilityShim {
        &self.shim
    }

    pub fn registry(&self) -> &EventNameRegistry {
        self.shim.registry()
    }

    /// Child of the context in scope, or a new root
    pub fn context(&self, operation: &str, component: &str) -> OperationContext {
        OperationContext::derive(&self.ids, operation, component, None)
    }
}

impl Default for Core {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

pub struct CoreBuilder {
    config: CoreConfig,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<CorrelationIds>,
    registry: Option<EventNameRegistry>,
}

impl CoreBuilder {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            clock: None,
            ids: None,
            registry: None,
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn ids(mut self, ids: CorrelationIds) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Defaults to [`EventNameRegistry::standard`]
    pub fn registry(mut self, registry: EventNameRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Core {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| CorrelationIds::timestamped(Arc::clone(&clock)));
        let registry = self.registry.unwrap_or_else(EventNameRegistry::standard);

        let bus = EventBus::with_config(&self.config.history, Arc::clone(&clock), ids.clone());
        let errors = ErrorHandler::new(
            bus.clone(),
            Arc::clone(&clock),
            ids.clone(),
            HandlerSettings::from(&self.config),
        );
        let shim = CompatibilityShim::new(Arc::new(registry), self.config.deprecation_warnings);

        tracing::debug!(
            history = self.config.history.enabled,
            events = shim.registry().events().count(),
            "core initialised"
        );

        Core {
            config: Arc::new(self.config),
            clock,
            ids,
            bus,
            errors,
            shim,
        }
    }
}
